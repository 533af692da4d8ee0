// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Identity resolution for wrapped callables.
//!
//! An [`Identity`] is the `(module, class, function)` triple that tags every
//! metric a wrapped function emits. It is derived from the callable's type name:
//! for fn items, `std::any::type_name` is the path where the function is
//! *defined*, so the module reflects the definition site rather than whoever
//! happens to call it.
//!
//! | type name                               | module      | class   | function |
//! |-----------------------------------------|-------------|---------|----------|
//! | `app::utils::make_request`              | `app::utils`| -       | `make_request` |
//! | `app::api::Handler::get`                | `app::api`  | `Handler` | `get` |
//! | `<app::api::Handler as app::Route>::get`| `app::api`  | `Handler` | `get` |
//! | `app::jobs::run::{{closure}}`           | `app::jobs` | -       | `run`    |
//!
//! Closures resolve to the named function they are written in. Wrapped
//! wrappers resolve to the innermost function (see [`Measured`](crate::Measured)).
//!
//! A segment is read as a class when it is UpperCamelCase. All-caps segments
//! such as `API` are treated as modules, as are lowercase ones.
//!
//! A fn item declared inside another function carries that function in its
//! type name (`app::handlers::outer::helper`). Type names cannot tell such a
//! scope apart from a module, so wrappers created with
//! [`measure_function!`](crate::measure_function) record their [`CallSite`]
//! and use it to fold enclosing functions back into the module.

use crate::naming::Tags;

/// Function name used when nothing can be derived from the type name.
pub const ANONYMOUS: &str = "anonymous";

/// Where a measurement originated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    module: String,
    class: Option<String>,
    function: String,
}

impl Identity {
    /// Create an identity explicitly.
    ///
    /// An empty function name is replaced by [`ANONYMOUS`].
    pub fn new(module: impl Into<String>, function: impl Into<String>) -> Self {
        let function = function.into();
        Self {
            module: module.into(),
            class: None,
            function: if function.is_empty() {
                ANONYMOUS.to_string()
            } else {
                function
            },
        }
    }

    /// Attach a class. An empty name clears it.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        self.class = (!class.is_empty()).then_some(class);
        self
    }

    /// Resolve the identity of a callable type.
    pub fn of<F: ?Sized>() -> Self {
        Self::resolve(std::any::type_name::<F>())
    }

    /// Resolve the identity of a callable value.
    pub fn of_val<F: ?Sized>(_callable: &F) -> Self {
        Self::of::<F>()
    }

    /// Parse a Rust type name into an identity. Never fails.
    pub fn resolve(type_path: &str) -> Self {
        let path = type_path.trim().trim_start_matches('&').trim_start();
        let path = path.strip_prefix("mut ").unwrap_or(path);

        if path.contains("dyn ") {
            return Self::new("", ANONYMOUS);
        }

        if path.starts_with('<') {
            if let Some(identity) = resolve_qualified(path) {
                return identity;
            }
            return Self::new("", ANONYMOUS);
        }

        let stripped = strip_generics(path);
        if stripped.contains('(') || stripped.contains(' ') {
            return Self::new("", ANONYMOUS);
        }

        let mut segments = named_segments(&stripped);
        let Some(function) = segments.pop() else {
            return Self::new("", ANONYMOUS);
        };

        let class = match segments.last() {
            Some(segment) if is_type_name(segment) => segments.pop(),
            _ => None,
        };

        Self {
            module: segments.join("::"),
            class: class.map(str::to_string),
            function: function.to_string(),
        }
    }

    /// The defining module, as a Rust path.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// The enclosing type, if any.
    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    /// The function name. Never empty.
    pub fn function(&self) -> &str {
        &self.function
    }

    /// The module in dotted form, as used in tags and metric names.
    pub fn module_tag(&self) -> String {
        dotted(&self.module)
    }

    /// The identity-derived tag layer: `module`, `def` and optionally `class`.
    pub fn tags(&self) -> Tags {
        let mut tags = Tags::new();
        if !self.module.is_empty() {
            tags.insert("module".to_string(), self.module_tag());
        }
        tags.insert("def".to_string(), self.function.clone());
        if let Some(class) = &self.class {
            tags.insert("class".to_string(), class.clone());
        }
        tags
    }
}

/// Convert a Rust path (`a::b`) to dotted form (`a.b`).
pub(crate) fn dotted(path: &str) -> String {
    path.replace("::", ".")
}

/// `<Self as Trait>::method` style paths.
fn resolve_qualified(path: &str) -> Option<Identity> {
    let mut depth = 0usize;
    let mut end = None;
    for (idx, c) in path.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    end = Some(idx);
                    break;
                }
            }
            _ => {}
        }
    }
    let end = end?;

    let inner = &path[1..end];
    let self_ty = inner.split(" as ").next().unwrap_or(inner).trim();
    let self_ty = self_ty.trim_start_matches('&').trim_start();
    let self_ty = self_ty.strip_prefix("mut ").unwrap_or(self_ty);

    let rest = path[end + 1..].trim_start_matches("::");
    let rest = strip_generics(rest);
    let function = named_segments(&rest).pop()?.to_string();

    let self_path = strip_generics(self_ty);
    let mut self_segments = named_segments(&self_path);
    let class = self_segments.pop().map(str::to_string);

    let mut identity = Identity::new(self_segments.join("::"), function);
    identity.class = class;
    Some(identity)
}

/// Remove every `<...>` group, including nested ones.
fn strip_generics(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut depth = 0usize;
    for c in path.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

/// Path segments, minus compiler-generated ones like `{{closure}}`.
fn named_segments(path: &str) -> Vec<&str> {
    path.split("::")
        .map(str::trim)
        .filter(|segment| !segment.is_empty() && !segment.starts_with("{{"))
        .collect()
}

fn is_type_name(segment: &str) -> bool {
    let mut chars = segment.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let shouting = segment.len() > 1
        && segment
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');
    first.is_ascii_uppercase() && !shouting
}

/// Where a wrapper was created: the module, and the type name of a marker
/// closure naming the innermost enclosing function.
///
/// Build one with [`call_site!`](crate::call_site).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    module: &'static str,
    scope: &'static str,
}

impl CallSite {
    pub fn new(module: &'static str, scope: &'static str) -> Self {
        Self { module, scope }
    }

    pub fn module(&self) -> &'static str {
        self.module
    }

    /// Move a function declared inside the call site's enclosing function
    /// back to the call site's module. Other identities are returned as-is.
    pub fn apply(&self, identity: Identity) -> Identity {
        let module = named_segments(self.module);
        let scope_path = strip_generics(self.scope);
        let scope = named_segments(&scope_path);
        if scope.len() <= module.len() || !scope.starts_with(&module) {
            return identity;
        }

        let nested = named_segments(&identity.module).starts_with(&scope);
        if nested {
            Identity {
                module: self.module.to_string(),
                ..identity
            }
        } else {
            identity
        }
    }
}

/// The [`CallSite`] of the invoking code.
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::identity::CallSite::new(
            ::std::module_path!(),
            ::std::any::type_name_of_val(&|| ()),
        )
    };
}
