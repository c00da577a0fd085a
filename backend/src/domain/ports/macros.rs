//! Helper macro for declaring driven-port error enums.
//!
//! Each generated enum derives `thiserror::Error`, gains one snake_case
//! constructor per variant (string-ish fields accept `impl Into<_>`), and a
//! `kind()` accessor that names the variant for structured log fields.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[must_use]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_args $variant [] [] $( $field : $ty, )*);
    };

    (@ctor_args $variant:ident [$($params:tt)*] [$($inits:tt)*]) => {
        ::paste::paste! {
            #[must_use]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (
        @ctor_args $variant:ident [$($params:tt)*] [$($inits:tt)*]
        $field:ident : $ty:ty, $($rest:tt)*
    ) => {
        define_port_error!(
            @ctor_args
            $variant
            [$($params)* $field: impl Into<$ty>,]
            [$($inits)* $field: $field.into(),]
            $($rest)*
        );
    };

    (@pattern $name:ident $variant:ident) => { $name::$variant };
    (@pattern $name:ident $variant:ident { $($field:tt)* }) => { $name::$variant { .. } };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*

            /// Variant name in snake_case.
            pub fn kind(&self) -> &'static str {
                ::paste::paste! {
                    match self {
                        $(
                            define_port_error!(@pattern $name $variant $( { $($field)* } )?) =>
                                stringify!([<$variant:snake>]),
                        )*
                    }
                }
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    define_port_error! {
        pub enum SamplePortError {
            Offline => "sample port offline",
            Rejected { reason: String } => "sample port rejected: {reason}",
            Throttled { reason: String, retry_after: u32 } =>
                "sample port throttled ({retry_after}s): {reason}",
        }
    }

    #[rstest]
    fn unit_variants_get_a_constructor() {
        assert_eq!(SamplePortError::offline(), SamplePortError::Offline);
        assert_eq!(SamplePortError::offline().to_string(), "sample port offline");
    }

    #[rstest]
    fn string_fields_accept_str() {
        let err = SamplePortError::rejected("quota");
        assert_eq!(err.to_string(), "sample port rejected: quota");
    }

    #[rstest]
    fn mixed_fields_keep_their_types() {
        let err = SamplePortError::throttled("busy", 30_u32);
        assert_eq!(err.to_string(), "sample port throttled (30s): busy");
    }

    #[rstest]
    #[case(SamplePortError::offline(), "offline")]
    #[case(SamplePortError::rejected("x"), "rejected")]
    #[case(SamplePortError::throttled("x", 1_u32), "throttled")]
    fn kind_names_the_variant(#[case] err: SamplePortError, #[case] expected: &str) {
        assert_eq!(err.kind(), expected);
    }
}
