//! Helper macro for declaring port error enums with snake_case constructors.
//!
//! Every variant carries named fields. Each one gets a constructor named after
//! the variant in snake_case whose parameters take `impl Into<FieldType>`, so
//! adapters can write `StoreError::not_found("consent 7")`.

macro_rules! define_port_error {
    (@constructor $variant:ident ($($params:tt)*) ($($fields:tt)*)) => {
        ::paste::paste! {
            #[doc = concat!("Build [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($fields)* }
            }
        }
    };

    (
        @constructor $variant:ident ($($params:tt)*) ($($fields:tt)*)
        $field:ident : $ty:ty, $($rest:tt)*
    ) => {
        define_port_error!(
            @constructor $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($fields)* $field: $field.into(),)
            $($rest)*
        );
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),* $(,)? } => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant {
                    $(
                        #[doc = concat!("The `", stringify!($field), "` detail of this failure.")]
                        $field : $ty
                    ),*
                },
            )*
        }

        impl $name {
            $(
                define_port_error!(@constructor $variant () () $($field : $ty,)*);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Constructor generation for declared port errors.

    define_port_error! {
        pub enum SamplePortError {
            Offline { message: String } => "offline: {message}",
            Retries { attempts: u32 } => "gave up after {attempts} attempts",
            Rejected { reason: String, status: u16 } => "rejected with {status}: {reason}",
        }
    }

    #[test]
    fn string_fields_accept_borrowed_input() {
        let err = SamplePortError::offline("dns lookup failed");
        assert_eq!(err.to_string(), "offline: dns lookup failed");
    }

    #[test]
    fn non_string_fields_keep_their_type() {
        let err = SamplePortError::retries(3_u32);
        assert_eq!(err, SamplePortError::Retries { attempts: 3 });
    }

    #[test]
    fn mixed_fields_render_in_message() {
        let err = SamplePortError::rejected("stale consent", 409_u16);
        assert_eq!(err.to_string(), "rejected with 409: stale consent");
    }
}
