//! Domain definitions.

pub mod chair;
pub mod estate;

pub use self::{chair::Chair, estate::Estate};

/// Defines a bounded text newtype of a domain entity.
macro_rules! define_text {
    (
        #[doc = $doc:literal]
        $name:ident(max = $max:literal)
    ) => {
        #[doc = $doc]
        #[derive(
            ::derive_more::AsRef,
            Clone,
            Debug,
            ::derive_more::Display,
            Eq,
            Hash,
            PartialEq,
        )]
        #[cfg_attr(
            feature = "postgres",
            derive(::postgres_types::FromSql, ::postgres_types::ToSql),
            postgres(transparent)
        )]
        #[as_ref(forward)]
        pub struct $name(String);

        impl $name {
            #[doc = ::core::concat!(
                "Creates a new [`", ::core::stringify!($name), "`] if the \
                 given `text` is at most ", ::core::stringify!($max),
                " characters long.",
            )]
            #[must_use]
            pub fn new(text: impl Into<String>) -> Option<Self> {
                let text = text.into();
                (text.chars().count() <= $max).then_some(Self(text))
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = &'static str;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s).ok_or(::core::concat!(
                    "invalid `", ::core::stringify!($name), "`",
                ))
            }
        }
    };
}

pub(crate) use define_text;
