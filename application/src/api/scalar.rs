//! GraphQL scalar definitions.

use std::{fmt, marker::PhantomData, str::FromStr};

use juniper::{
    GraphQLType, InputValue, ParseScalarResult, ParseScalarValue, ScalarToken,
    ScalarValue, Value,
};

/// Helper type to use in `#[graphql(with = ..)]` attribute of API newtypes
/// wrapping validated domain values (`SheepTag`, `Roi`, `ContractNotes`, ...).
///
/// The domain `As` type owns both the textual format and the validation:
/// output is its [`Display`], input is parsed with its [`FromStr`], so the
/// API never accepts a value the domain would reject.
///
/// [`Display`]: fmt::Display
#[derive(Debug)]
pub struct Via<As>(PhantomData<As>);

impl<As> Via<As> {
    /// Renders the wrapped `As` value as a string scalar [`Value`].
    pub fn to_output<T, S>(value: &T) -> Value<S>
    where
        As: fmt::Display,
        T: AsRef<As>,
        S: ScalarValue,
    {
        Value::from(value.as_ref().to_string())
    }

    /// Parses a string scalar [`InputValue`] into the `As` domain value and
    /// wraps it into the API type `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the input value is not a string;
    /// - the domain rejects the string as an `As` value;
    /// - the `As` value cannot be converted into the API type.
    pub fn from_input<T, S>(input: &InputValue<S>) -> Result<T, String>
    where
        As: FromStr,
        As::Err: fmt::Display,
        T: TryFrom<As> + GraphQLType<S, TypeInfo = ()>,
        T::Error: fmt::Display,
        S: ScalarValue,
    {
        let name = scalar_name::<T, S>();
        let s = input.as_string_value().ok_or_else(|| {
            format!(
                "Cannot parse input scalar `{name}`: expected string input \
                 value, found: {input}",
            )
        })?;
        s.parse::<As>()
            .map_err(|e| {
                format!(
                    "Cannot parse input scalar `{name}` from \"{s}\" string: \
                     {e}",
                )
            })?
            .try_into()
            .map_err(|e| format!("Cannot parse input scalar `{name}`: {e}"))
    }

    /// Parses the provided [`ScalarToken`] as a [`String`].
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be parsed as [`String`].
    pub fn parse_token<S: ScalarValue>(
        value: ScalarToken<'_>,
    ) -> ParseScalarResult<S> {
        <String as ParseScalarValue<S>>::from_str(value)
    }
}

/// Returns the GraphQL name of the `T` scalar.
fn scalar_name<T, S>() -> &'static str
where
    T: GraphQLType<S, TypeInfo = ()>,
    S: ScalarValue,
{
    T::name(&()).unwrap_or("<unnamed>")
}

#[cfg(test)]
mod spec {
    use juniper::{DefaultScalarValue, InputValue, Value};
    use service::domain;

    use crate::api::{contract, sheep};

    use super::Via;

    type TagVia = Via<domain::sheep::Tag>;
    type RoiVia = Via<domain::contract::Roi>;

    #[test]
    fn parses_valid_tag() {
        let tag: sheep::Tag =
            TagVia::from_input::<_, DefaultScalarValue>(&InputValue::scalar(
                "AF-0001".to_owned(),
            ))
            .unwrap();

        assert_eq!(tag.to_string(), "AF-0001");
        assert_eq!(
            TagVia::to_output::<_, DefaultScalarValue>(&tag),
            Value::scalar("AF-0001".to_owned()),
        );
    }

    #[test]
    fn rejects_tag_rejected_by_domain() {
        let err = TagVia::from_input::<sheep::Tag, DefaultScalarValue>(
            &InputValue::scalar(" AF-0001".to_owned()),
        )
        .unwrap_err();

        assert!(err.contains("`SheepTag`"), "{err}");
        assert!(err.contains("invalid `Tag`"), "{err}");
    }

    #[test]
    fn rejects_non_string_input() {
        let err = RoiVia::from_input::<contract::Roi, DefaultScalarValue>(
            &InputValue::scalar(15),
        )
        .unwrap_err();

        assert!(err.contains("expected string input"), "{err}");
    }

    #[test]
    fn parses_negative_roi() {
        let roi: contract::Roi =
            RoiVia::from_input::<_, DefaultScalarValue>(&InputValue::scalar(
                "-65.5".to_owned(),
            ))
            .unwrap();

        assert_eq!(roi.to_string(), "-65.5");
        assert!(RoiVia::from_input::<contract::Roi, DefaultScalarValue>(
            &InputValue::scalar("lots".to_owned()),
        )
        .is_err());
    }
}
