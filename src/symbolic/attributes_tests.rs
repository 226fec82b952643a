use crate::symbolic::attributes::{Attribute, Attributes};
use crate::symbolic::eval_errors::EvalError;
use std::str::FromStr;
//___________________________________TESTS____________________________________

mod tests {
    use super::*;

    #[test]
    fn test_default_is_all_off() {
        let attrs = Attributes::default();
        assert!(attrs.to_names().is_empty());
        assert!(!attrs.get(Attribute::Orderless));
        assert!(!attrs.holds_operand(1));
    }

    #[test]
    fn test_set_and_get() {
        let mut attrs = Attributes::new(&[Attribute::Flat, Attribute::Orderless]);
        assert!(attrs.flat && attrs.orderless);
        assert!(attrs.get(Attribute::Flat));
        attrs.set(Attribute::Flat, false);
        assert!(!attrs.get(Attribute::Flat));
        assert!(attrs.get(Attribute::Orderless));
    }

    #[test]
    fn test_names_round_trip_sorted() {
        let attrs = Attributes::from_names(&["Protected", "Listable", "Flat"]).unwrap();
        assert_eq!(attrs.to_names(), vec!["Flat", "Listable", "Protected"]);
        assert_eq!(Attribute::from_str("HoldAllComplete").unwrap(), Attribute::HoldAllComplete);
        assert_eq!(Attribute::NHoldRest.to_string(), "NHoldRest");
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(
            Attributes::from_names(&["Orderless", "Commutative"]),
            Err(EvalError::UnknownAttribute("Commutative".to_string()))
        );
    }

    #[test]
    fn test_hold_positions() {
        let first = Attributes::new(&[Attribute::HoldFirst]);
        assert!(first.holds_operand(1));
        assert!(!first.holds_operand(2));
        let rest = Attributes::new(&[Attribute::HoldRest]);
        assert!(!rest.holds_operand(1));
        assert!(rest.holds_operand(2));
        assert!(rest.holds_operand(5));
        let all = Attributes::new(&[Attribute::HoldAll]);
        assert!(all.holds_operand(1) && all.holds_operand(3));
        let complete = Attributes::new(&[Attribute::HoldAllComplete]);
        assert!(complete.holds_operand(2));
        assert!(complete.keeps_sequences());
    }

    #[test]
    fn test_sequence_hold() {
        assert!(Attributes::new(&[Attribute::SequenceHold]).keeps_sequences());
        assert!(!Attributes::new(&[Attribute::HoldAll]).keeps_sequences());
    }
}
