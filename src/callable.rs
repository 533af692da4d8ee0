// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Uniform calling of functions of any arity.
//!
//! Arguments are passed as a tuple so one wrapper type can front every
//! signature: `f(a, b)` becomes `measured.call((a, b))`. Functions that want a
//! [`Measure`] handle take it as their last parameter, `&dyn Measure`.

use crate::handle::Measure;

/// A function callable with the argument tuple `Args`.
pub trait Callable<Args> {
    type Output;

    fn invoke(&self, args: Args) -> Self::Output;
}

/// A function callable with the argument tuple `Args` plus a trailing handle.
pub trait CallableWithHandle<Args> {
    type Output;

    fn invoke_with(&self, args: Args, statsd: &dyn Measure) -> Self::Output;
}

macro_rules! impl_callable {
    ($($arg:ident),*) => {
        impl<Func, Out, $($arg,)*> Callable<($($arg,)*)> for Func
        where
            Func: Fn($($arg),*) -> Out,
        {
            type Output = Out;

            #[allow(non_snake_case)]
            fn invoke(&self, ($($arg,)*): ($($arg,)*)) -> Out {
                (self)($($arg),*)
            }
        }

        impl<Func, Out, $($arg,)*> CallableWithHandle<($($arg,)*)> for Func
        where
            Func: Fn($($arg,)* &dyn Measure) -> Out,
        {
            type Output = Out;

            #[allow(non_snake_case)]
            fn invoke_with(&self, ($($arg,)*): ($($arg,)*), statsd: &dyn Measure) -> Out {
                (self)($($arg,)* statsd)
            }
        }
    };
}

impl_callable!();
impl_callable!(A1);
impl_callable!(A1, A2);
impl_callable!(A1, A2, A3);
impl_callable!(A1, A2, A3, A4);
impl_callable!(A1, A2, A3, A4, A5);
impl_callable!(A1, A2, A3, A4, A5, A6);
impl_callable!(A1, A2, A3, A4, A5, A6, A7);
impl_callable!(A1, A2, A3, A4, A5, A6, A7, A8);

#[cfg(test)]
mod tests {
    use super::*;

    fn zero() -> &'static str {
        "zero"
    }

    fn three(a: u8, b: String, c: &str) -> String {
        format!("{a}{b}{c}")
    }

    #[test]
    fn test_invoke_arities() {
        assert_eq!(zero.invoke(()), "zero");
        assert_eq!(three.invoke((1, "b".to_string(), "c")), "1bc");
        assert_eq!((|x: i32| x * 2).invoke((21,)), 42);
    }
}
