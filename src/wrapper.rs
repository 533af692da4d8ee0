// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Function wrappers that count and time every call.
//!
//! ```rust
//! use std::sync::Arc;
//! use influxstats::{Client, Measure, Namespace, RecordingTransport, Tags};
//!
//! fn make_request(url: &str, statsd: &dyn Measure) -> usize {
//!     statsd.incr("another_metric").ok();
//!     url.len()
//! }
//!
//! let transport = Arc::new(RecordingTransport::new());
//! let client = Client::new(Namespace::new("app", "", Tags::new()), transport.clone());
//!
//! let make_request = client.measure_function().wrap_with_handle(make_request).unwrap();
//! assert_eq!(make_request.call(("https://example.com",)), 19);
//!
//! let names: Vec<_> = transport.events().into_iter().map(|e| e.name).collect();
//! assert_eq!(names, ["app.calls", "app.another_metric", "app.duration"]);
//! ```
//!
//! Each call:
//!
//! 1. resolves the function's [`Identity`] (once, then cached per wrapper)
//! 2. emits the call counter
//! 3. builds a [`MeasurementHandle`] if the function takes one
//! 4. runs the function and hands back its output untouched
//! 5. emits the duration, also when the function panics
//!
//! Failures in steps 2 and 5 are logged on the instrumentation target and
//! otherwise ignored.

use std::fmt;
use std::future::Future;
use std::time::Instant;

use once_cell::sync::OnceCell;

use crate::callable::{Callable, CallableWithHandle};
use crate::client::Client;
use crate::error::{ConfigurationError, MetricsError};
use crate::handle::{Measure, MeasurementHandle};
use crate::identity::{CallSite, Identity};
use crate::naming::{validate_fragment, MetricKind, Tags, DEFAULT_COUNT_FRAGMENT, DEFAULT_TIME_FRAGMENT};
use crate::telemetry::report_emit_failure;

/// Wrapper configuration, created by [`Client::measure_function`].
#[derive(Debug, Clone)]
#[must_use = "call `wrap` or `wrap_with_handle` to apply the wrapper"]
pub struct MeasureFunction {
    client: Client,
    name: Option<String>,
    extra_tags: Tags,
    identity: Option<Identity>,
    class: Option<String>,
    call_site: Option<CallSite>,
    log: bool,
}

impl MeasureFunction {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            name: None,
            extra_tags: Tags::new(),
            identity: None,
            class: None,
            call_site: None,
            log: false,
        }
    }

    /// Prefix the automatic metrics: `{name}.calls` and `{name}.duration`.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Tags added to every metric of the wrapped function, handle metrics included.
    pub fn extra_tags(mut self, tags: Tags) -> Self {
        self.extra_tags.extend(tags);
        self
    }

    /// Set the class tag explicitly, e.g. for a closure stored on a type.
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Use an explicit identity instead of resolving one from the callable.
    pub fn identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Record where the wrapper is created, so functions declared inside the
    /// enclosing function are tagged with its module. Set by
    /// [`measure_function!`](crate::measure_function).
    pub fn call_site(mut self, call_site: CallSite) -> Self {
        self.call_site = Some(call_site);
        self
    }

    /// Log the start and end of every call at `info`.
    pub fn log(mut self, log: bool) -> Self {
        self.log = log;
        self
    }

    /// Wrap a function that takes no measurement handle.
    pub fn wrap<F>(self, f: F) -> Result<Measured<F>, ConfigurationError> {
        Ok(Measured {
            instrument: self.into_instrument::<F>()?,
            f,
        })
    }

    /// Wrap a function whose last parameter is `&dyn Measure`.
    pub fn wrap_with_handle<F>(self, f: F) -> Result<MeasuredWithHandle<F>, ConfigurationError> {
        Ok(MeasuredWithHandle {
            instrument: self.into_instrument::<F>()?,
            f,
        })
    }

    fn into_instrument<F>(self) -> Result<Instrument, ConfigurationError> {
        let (count_fragment, time_fragment) = match &self.name {
            Some(name) => {
                validate_fragment(name)?;
                (
                    Some(format!("{name}.{DEFAULT_COUNT_FRAGMENT}")),
                    Some(format!("{name}.{DEFAULT_TIME_FRAGMENT}")),
                )
            }
            None => (None, None),
        };

        let identity = match self.identity {
            Some(identity) => match &self.class {
                Some(class) => OnceCell::with_value(identity.with_class(class.clone())),
                None => OnceCell::with_value(identity),
            },
            None => OnceCell::new(),
        };

        Ok(Instrument {
            client: self.client,
            count_fragment,
            time_fragment,
            extra_tags: self.extra_tags,
            log: self.log,
            type_path: innermost_type_path(std::any::type_name::<F>()),
            class: self.class,
            call_site: self.call_site,
            identity,
        })
    }
}

/// [`Client::measure_function`] with the invoking code's [`CallSite`] recorded.
///
/// ```rust
/// use std::sync::Arc;
/// use influxstats::{measure_function, Client, Namespace, RecordingTransport, Tags};
///
/// let client = Client::new(Namespace::new("app", "", Tags::new()), Arc::new(RecordingTransport::new()));
///
/// fn helper() {}
/// let helper = measure_function!(client).wrap(helper).unwrap();
/// assert_eq!(helper.identity().function(), "helper");
/// ```
#[macro_export]
macro_rules! measure_function {
    ($client:expr) => {
        ($client).measure_function().call_site($crate::call_site!())
    };
}

/// Everything a wrapper needs per call, independent of the function type.
#[derive(Debug)]
struct Instrument {
    client: Client,
    count_fragment: Option<String>,
    time_fragment: Option<String>,
    extra_tags: Tags,
    log: bool,
    type_path: &'static str,
    class: Option<String>,
    call_site: Option<CallSite>,
    identity: OnceCell<Identity>,
}

impl Instrument {
    fn identity(&self) -> &Identity {
        self.identity.get_or_init(|| {
            let mut identity = Identity::resolve(self.type_path);
            if let Some(call_site) = &self.call_site {
                identity = call_site.apply(identity);
            }
            match &self.class {
                Some(class) => identity.with_class(class.clone()),
                None => identity,
            }
        })
    }

    /// Count the call and start its timer.
    fn begin(&self) -> CallTimer<'_> {
        let identity = self.identity();

        let counted = self
            .client
            .namespace()
            .build(
                Some(identity),
                MetricKind::Count,
                self.count_fragment.as_deref(),
                &[&self.extra_tags],
            )
            .map_err(MetricsError::from)
            .and_then(|metric| {
                self.client
                    .transport()
                    .increment(&metric.name, 1, &metric.tags)
                    .map_err(MetricsError::from)
            });
        if let Err(err) = counted {
            report_emit_failure(
                self.count_fragment.as_deref().unwrap_or(DEFAULT_COUNT_FRAGMENT),
                &err,
            );
        }

        if self.log {
            tracing::info!(
                module = %identity.module(),
                class = identity.class().unwrap_or(""),
                function = %identity.function(),
                "measure_function begin"
            );
        }

        CallTimer {
            instrument: self,
            identity,
            start: Instant::now(),
        }
    }
}

/// Emits the call duration when dropped, whether the call returned or unwound.
struct CallTimer<'a> {
    instrument: &'a Instrument,
    identity: &'a Identity,
    start: Instant,
}

impl Drop for CallTimer<'_> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        let instrument = self.instrument;

        let timed = instrument
            .client
            .namespace()
            .build(
                Some(self.identity),
                MetricKind::Time,
                instrument.time_fragment.as_deref(),
                &[&instrument.extra_tags],
            )
            .map_err(MetricsError::from)
            .and_then(|metric| {
                instrument
                    .client
                    .transport()
                    .timing(&metric.name, elapsed, &metric.tags)
                    .map_err(MetricsError::from)
            });
        if let Err(err) = timed {
            report_emit_failure(
                instrument.time_fragment.as_deref().unwrap_or(DEFAULT_TIME_FRAGMENT),
                &err,
            );
        }

        if instrument.log {
            tracing::info!(
                module = %self.identity.module(),
                class = self.identity.class().unwrap_or(""),
                function = %self.identity.function(),
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                panicked = std::thread::panicking(),
                "measure_function end"
            );
        }
    }
}

/// A function wrapped with a call counter and a duration timer.
///
/// Arguments are passed as a tuple: `f(a, b)` becomes `measured.call((a, b))`.
/// A `Measured` is itself callable, so wrappers stack; every layer is tagged
/// with the innermost function.
pub struct Measured<F> {
    instrument: Instrument,
    f: F,
}

impl<F> Measured<F> {
    /// Call the wrapped function.
    pub fn call<Args>(&self, args: Args) -> F::Output
    where
        F: Callable<Args>,
    {
        let _timer = self.instrument.begin();
        self.f.invoke(args)
    }

    /// Call a wrapped function returning a future.
    ///
    /// The call is counted immediately; the duration covers the future up to
    /// completion, or up to the point it is dropped.
    pub fn call_async<'a, Args>(
        &'a self,
        args: Args,
    ) -> impl Future<Output = <F::Output as Future>::Output> + 'a
    where
        F: Callable<Args>,
        F::Output: Future + 'a,
    {
        let timer = self.instrument.begin();
        let fut = self.f.invoke(args);
        async move {
            let _timer = timer;
            fut.await
        }
    }

    /// The identity every metric of this function is tagged with.
    pub fn identity(&self) -> &Identity {
        self.instrument.identity()
    }

    /// The unwrapped function.
    pub fn inner(&self) -> &F {
        &self.f
    }
}

/// A wrapped function that receives a [`Measure`] handle as its last argument.
pub struct MeasuredWithHandle<F> {
    instrument: Instrument,
    f: F,
}

impl<F> MeasuredWithHandle<F> {
    /// Call the wrapped function, injecting a [`MeasurementHandle`] for this call.
    pub fn call<Args>(&self, args: Args) -> F::Output
    where
        F: CallableWithHandle<Args>,
    {
        let timer = self.instrument.begin();
        let handle = MeasurementHandle::new(
            &self.instrument.client,
            timer.identity,
            &self.instrument.extra_tags,
        );
        self.f.invoke_with(args, &handle)
    }

    /// Call the wrapped function with the caller's own handle, passed through as-is.
    pub fn call_with<Args>(&self, args: Args, statsd: &dyn Measure) -> F::Output
    where
        F: CallableWithHandle<Args>,
    {
        let _timer = self.instrument.begin();
        self.f.invoke_with(args, statsd)
    }

    /// The identity every metric of this function is tagged with.
    pub fn identity(&self) -> &Identity {
        self.instrument.identity()
    }

    /// The unwrapped function.
    pub fn inner(&self) -> &F {
        &self.f
    }
}

impl<F> fmt::Debug for Measured<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Measured")
            .field("instrument", &self.instrument)
            .finish_non_exhaustive()
    }
}

impl<F> fmt::Debug for MeasuredWithHandle<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeasuredWithHandle")
            .field("instrument", &self.instrument)
            .finish_non_exhaustive()
    }
}

impl<F, Args> Callable<Args> for Measured<F>
where
    F: Callable<Args>,
{
    type Output = F::Output;

    fn invoke(&self, args: Args) -> F::Output {
        self.call(args)
    }
}

impl<F, Args> Callable<Args> for MeasuredWithHandle<F>
where
    F: CallableWithHandle<Args>,
{
    type Output = F::Output;

    fn invoke(&self, args: Args) -> F::Output {
        self.call(args)
    }
}

impl<F, Args> CallableWithHandle<Args> for MeasuredWithHandle<F>
where
    F: CallableWithHandle<Args>,
{
    type Output = F::Output;

    fn invoke_with(&self, args: Args, statsd: &dyn Measure) -> F::Output {
        self.call_with(args, statsd)
    }
}

/// Look through wrapper layers to the type of the innermost callable.
fn innermost_type_path(mut path: &'static str) -> &'static str {
    while let Some(inner) = strip_wrapper(path) {
        path = inner.trim();
    }
    path
}

fn strip_wrapper(path: &'static str) -> Option<&'static str> {
    let wrappers = [
        std::any::type_name::<Measured<()>>(),
        std::any::type_name::<MeasuredWithHandle<()>>(),
    ];
    wrappers.into_iter().find_map(move |wrapper| {
        let base = wrapper.split('<').next().unwrap_or(wrapper);
        path.strip_prefix(base)?.strip_prefix('<')?.strip_suffix('>')
    })
}
