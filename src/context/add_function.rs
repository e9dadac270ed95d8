use crate::{Error, KelpValue, Rest, eval::raise_error_value, value::FromValue};

/// How many arguments a primitive accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == *n,
            Arity::AtLeast(n) => count >= *n,
        }
    }
}

type PrimitiveBody = dyn Fn(&[KelpValue]) -> Result<KelpValue, Error>;

/// A function implemented in Rust.
pub struct Primitive {
    name: String,
    arity: Arity,
    body: Box<PrimitiveBody>,
}

impl Primitive {
    pub fn new(
        name: &str,
        arity: Arity,
        body: impl Fn(&[KelpValue]) -> Result<KelpValue, Error> + 'static,
    ) -> Self {
        Primitive {
            name: name.to_string(),
            arity,
            body: Box::new(body),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Checks the argument count and runs the body.  An error value returned
    /// by the body is raised as a failure.
    pub(crate) fn call(&self, args: &[KelpValue]) -> Result<KelpValue, Error> {
        if !self.arity.accepts(args.len()) {
            return Err(Error::argument_error(
                &format_args!("#<primitive {}>", self.name),
                args,
            ));
        }
        raise_error_value((self.body)(args)?)
    }
}

fn next_arg<T: FromValue>(args: &mut std::slice::Iter<'_, KelpValue>) -> Result<T, Error> {
    match args.next() {
        Some(arg) => T::from_value(arg.clone()),
        None => Err(Error::lisp_error("missing argument")),
    }
}

fn rest_args<T: FromValue>(args: std::slice::Iter<'_, KelpValue>) -> Result<Rest<T>, Error> {
    args.cloned()
        .map(T::from_value)
        .collect::<Result<Vec<T>, Error>>()
        .map(Rest::new)
}

/// Rust functions and closures that can be turned into a [`Primitive`].
///
/// Implemented for `Fn`s of up to five parameters whose types implement
/// [`FromValue`], optionally followed by a [`Rest`] parameter, returning
/// either `T` or `Result<T, Error>` where `T: Into<KelpValue>`.
pub trait KelpCallable<Args: 'static, Output: 'static, const HAS_REST: bool, const FALLIBLE: bool> {
    fn into_primitive(self, name: &str) -> Primitive;
}

macro_rules! impl_kelp_callable {
    ($count: literal: ($($arg: ident),*)) => {
        // Infallible, no rest
        #[allow(nonstandard_style)]
        impl<OutT, FnT, $($arg,)*>
        KelpCallable<($($arg,)*), OutT, false, false> for FnT
        where
            FnT: Fn($($arg),*) -> OutT + 'static,
            $($arg: FromValue + 'static,)*
            OutT: Into<KelpValue> + 'static,
        {
            fn into_primitive(self, name: &str) -> Primitive {
                Primitive::new(name, Arity::Exact($count), move |_args| {
                    let mut _args = _args.iter();
                    $(let $arg = next_arg::<$arg>(&mut _args)?;)*
                    Ok((self)($($arg),*).into())
                })
            }
        }

        // Fallible, no rest
        #[allow(nonstandard_style)]
        impl<OutT, FnT, $($arg,)*>
        KelpCallable<($($arg,)*), OutT, false, true> for FnT
        where
            FnT: Fn($($arg),*) -> Result<OutT, Error> + 'static,
            $($arg: FromValue + 'static,)*
            OutT: Into<KelpValue> + 'static,
        {
            fn into_primitive(self, name: &str) -> Primitive {
                Primitive::new(name, Arity::Exact($count), move |_args| {
                    let mut _args = _args.iter();
                    $(let $arg = next_arg::<$arg>(&mut _args)?;)*
                    Ok((self)($($arg),*)?.into())
                })
            }
        }

        // Infallible, with rest
        #[allow(nonstandard_style)]
        impl<RestT, OutT, FnT, $($arg,)*>
        KelpCallable<($($arg,)* Rest<RestT>,), OutT, true, false> for FnT
        where
            FnT: Fn($($arg,)* Rest<RestT>) -> OutT + 'static,
            $($arg: FromValue + 'static,)*
            RestT: FromValue + 'static,
            OutT: Into<KelpValue> + 'static,
        {
            fn into_primitive(self, name: &str) -> Primitive {
                Primitive::new(name, Arity::AtLeast($count), move |_args| {
                    let mut _args = _args.iter();
                    $(let $arg = next_arg::<$arg>(&mut _args)?;)*
                    let rest = rest_args::<RestT>(_args)?;
                    Ok((self)($($arg,)* rest).into())
                })
            }
        }

        // Fallible, with rest
        #[allow(nonstandard_style)]
        impl<RestT, OutT, FnT, $($arg,)*>
        KelpCallable<($($arg,)* Rest<RestT>,), OutT, true, true> for FnT
        where
            FnT: Fn($($arg,)* Rest<RestT>) -> Result<OutT, Error> + 'static,
            $($arg: FromValue + 'static,)*
            RestT: FromValue + 'static,
            OutT: Into<KelpValue> + 'static,
        {
            fn into_primitive(self, name: &str) -> Primitive {
                Primitive::new(name, Arity::AtLeast($count), move |_args| {
                    let mut _args = _args.iter();
                    $(let $arg = next_arg::<$arg>(&mut _args)?;)*
                    let rest = rest_args::<RestT>(_args)?;
                    Ok((self)($($arg,)* rest)?.into())
                })
            }
        }
    };
}

impl_kelp_callable!(0: ());
impl_kelp_callable!(1: (A));
impl_kelp_callable!(2: (A, B));
impl_kelp_callable!(3: (A, B, C));
impl_kelp_callable!(4: (A, B, C, D));
impl_kelp_callable!(5: (A, B, C, D, E));
