//! [`Money`]-related definitions.

use std::{fmt, str::FromStr};

use rust_decimal::{Decimal, RoundingStrategy};

use crate::define_kind;

/// Amount of money in some [`Currency`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Money {
    /// Amount of this [`Money`].
    pub amount: Decimal,

    /// [`Currency`] of this amount.
    pub currency: Currency,
}

impl Money {
    /// Indicates whether this [`Money`] amount is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Indicates whether this [`Money`] amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    /// Rounds this [`Money`] amount to the minor units of its [`Currency`].
    ///
    /// Midpoints are rounded away from zero.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self {
            amount: self.amount.round_dp_with_strategy(
                self.currency.minor_units(),
                RoundingStrategy::MidpointAwayFromZero,
            ),
            currency: self.currency,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { amount, currency } = self;
        write!(f, "{}{currency}", amount.normalize())
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 4 {
            return Err("too short");
        }

        let split = s.len() - 3;
        if !s.is_char_boundary(split) {
            return Err("invalid currency");
        }
        let (amount, currency) = s.split_at(split);
        let amount = Decimal::from_str(amount).map_err(|_| "invalid amount")?;
        let currency =
            Currency::from_str(currency).map_err(|_| "invalid currency")?;

        Ok(Self { amount, currency })
    }
}

define_kind! {
    #[doc = "Currency of a [`Money`] amount."]
    enum Currency {
        #[doc = "Indonesian Rupiah."]
        Idr = 1,

        #[doc = "US Dollar."]
        Usd = 2,
    }
}

impl Currency {
    /// Returns the number of decimal places this [`Currency`] is displayed
    /// with.
    #[must_use]
    pub const fn minor_units(self) -> u32 {
        match self {
            Self::Idr => 0,
            Self::Usd => 2,
        }
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Money in `{major}.{minor}{currency}` format, where:
    /// - `major` is an integer (possibly negative);
    /// - `minor` is an optional integer;
    /// - `currency` is a three-letter currency code (`IDR` or `USD`).
    #[graphql_scalar(with = Self, parse_token(String))]
    type Money = super::Money;

    impl Money {
        fn to_output<S: ScalarValue>(m: &Money) -> Value<S> {
            Value::scalar(m.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Money` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Money` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal_macros::dec;

    use super::{Currency, Money};

    #[test]
    fn from_str() {
        assert_eq!(
            Money::from_str("4500000IDR").unwrap(),
            Money {
                amount: dec!(4500000),
                currency: Currency::Idr,
            },
        );
        assert_eq!(
            Money::from_str("123.45USD").unwrap(),
            Money {
                amount: dec!(123.45),
                currency: Currency::Usd,
            },
        );
        assert_eq!(
            Money::from_str("-650000IDR").unwrap().amount,
            dec!(-650000),
        );

        assert!(Money::from_str("123.45").is_err());
        assert!(Money::from_str("123.45Us").is_err());
        assert!(Money::from_str("123.45EUR").is_err());
        assert!(Money::from_str("123.45Rupiah").is_err());

        assert!(Money::from_str("123.00USD").is_ok());
        assert!(Money::from_str("123USD").is_ok());
    }

    #[test]
    fn to_string() {
        assert_eq!(
            Money {
                amount: dec!(5200000),
                currency: Currency::Idr,
            }
            .to_string(),
            "5200000IDR",
        );
        assert_eq!(
            Money {
                amount: dec!(123.45),
                currency: Currency::Usd,
            }
            .to_string(),
            "123.45USD",
        );
        assert_eq!(
            Money {
                amount: dec!(123.00),
                currency: Currency::Usd,
            }
            .to_string(),
            "123USD",
        );
        assert_eq!(
            Money {
                amount: dec!(-350000.0),
                currency: Currency::Idr,
            }
            .to_string(),
            "-350000IDR",
        );
    }

    #[test]
    fn rounds_to_minor_units() {
        let idr = Money {
            amount: dec!(155555.5),
            currency: Currency::Idr,
        };
        assert_eq!(idr.rounded().amount, dec!(155556));

        let usd = Money {
            amount: dec!(10.005),
            currency: Currency::Usd,
        };
        assert_eq!(usd.rounded().amount, dec!(10.01));

        let negative = Money {
            amount: dec!(-0.5),
            currency: Currency::Idr,
        };
        assert_eq!(negative.rounded().amount, dec!(-1));
    }

    #[test]
    fn sign_checks() {
        assert!(!Money::from_str("0IDR").unwrap().is_positive());
        assert!(!Money::from_str("0IDR").unwrap().is_negative());
        assert!(Money::from_str("1IDR").unwrap().is_positive());
        assert!(Money::from_str("-1IDR").unwrap().is_negative());
    }
}
