use crate::globals;
use crate::symbolic::attributes::{Attribute, Attributes};
use crate::symbolic::eval_config::EvalConfig;
use crate::symbolic::eval_state::EvalState;
use crate::symbolic::pattern_matcher::{
    Binding, Bindings, pattern, pattern_null_seq, pattern_seq,
};
use crate::symbolic::rewrite::{
    Rule, apply_rule, commutative_replace, replace, replace_all, replace_repeated, rules_from_ex,
    substitute,
};
use crate::symbolic::symbolic_engine::Ex;
//___________________________________TESTS____________________________________

mod tests {
    use super::*;

    fn h(args: Vec<Ex>) -> Ex {
        Ex::apply(Ex::global("h"), args)
    }

    fn g(args: Vec<Ex>) -> Ex {
        Ex::apply(Ex::global("g"), args)
    }

    #[test]
    fn test_rule_from_ex() {
        let (a, x) = globals!(a, x);
        let plain = Rule::from_ex(&Ex::call("Rule", vec![pattern("a"), a.clone()])).unwrap();
        assert_eq!(plain.lhs, pattern("a"));
        assert_eq!(plain.condition, None);

        let test = Ex::call("SameQ", vec![a.clone(), x.clone()]);
        let delayed = Ex::call(
            "RuleDelayed",
            vec![pattern("a"), Ex::call("Condition", vec![Ex::int(1), test.clone()])],
        );
        let rule = Rule::from_ex(&delayed).unwrap();
        assert_eq!(rule.rhs, Ex::int(1));
        assert_eq!(rule.condition, Some(test));
        assert_eq!(rule.to_ex(), delayed);
        assert_eq!(rule.to_string(), "a_ :> Condition[1, SameQ[a, x]]");

        assert!(Rule::from_ex(&x).is_none());
        assert!(Rule::from_ex(&Ex::call("Rule", vec![x])).is_none());
    }

    #[test]
    fn test_rules_from_list() {
        let (a, b) = globals!(a, b);
        let single = Ex::call("Rule", vec![a.clone(), b.clone()]);
        assert_eq!(rules_from_ex(&single).unwrap().len(), 1);
        let list = Ex::list(vec![single.clone(), Ex::call("RuleDelayed", vec![b, a.clone()])]);
        assert_eq!(rules_from_ex(&list).unwrap().len(), 2);
        let broken = Ex::list(vec![single, a]);
        assert!(rules_from_ex(&broken).is_none());
    }

    #[test]
    fn test_substitute_splices_sequences() {
        let (s, y) = globals!(s, y);
        let mut bindings = Bindings::new();
        bindings.insert(
            "Global`s".to_string(),
            Binding::Sequence(vec![Ex::int(1), Ex::int(2)]),
        );
        bindings.insert("Global`y".to_string(), Binding::Single(Ex::int(3)));
        let result = substitute(&h(vec![s.clone(), y.clone(), s.clone()]), &bindings);
        assert_eq!(
            result,
            h(vec![Ex::int(1), Ex::int(2), Ex::int(3), Ex::int(1), Ex::int(2)])
        );
        // a sequence standing alone becomes Sequence[...]
        assert_eq!(
            substitute(&s, &bindings),
            Ex::call("Sequence", vec![Ex::int(1), Ex::int(2)])
        );
        assert_eq!(substitute(&y, &Bindings::new()), y);
    }

    #[test]
    fn test_replace_evaluates_replacement() {
        let mut state = EvalState::new();
        let a = Ex::global("a");
        let rule = Rule::new(
            h(vec![pattern("a")]),
            Ex::call("Plus", vec![a.clone(), Ex::int(1)]),
        );
        assert_eq!(replace(&mut state, &h(vec![Ex::int(41)]), &rule), Some(Ex::int(42)));
        assert_eq!(replace(&mut state, &g(vec![Ex::int(41)]), &rule), None);
    }

    #[test]
    fn test_replace_respects_condition() {
        let mut state = EvalState::new();
        let a = Ex::global("a");
        let integer_only = Rule::new(h(vec![pattern("a")]), g(vec![a.clone()])).with_condition(
            Ex::call("SameQ", vec![a, Ex::int(1)]),
        );
        assert_eq!(
            replace(&mut state, &h(vec![Ex::int(1)]), &integer_only),
            Some(g(vec![Ex::int(1)]))
        );
        assert_eq!(replace(&mut state, &h(vec![Ex::int(2)]), &integer_only), None);
    }

    #[test]
    fn test_replacement_assignments_are_rolled_back() {
        let mut state = EvalState::new();
        let flag = Ex::global("flag");
        let rhs = Ex::call(
            "CompoundExpression",
            vec![Ex::call("Set", vec![flag, Ex::int(1)]), Ex::int(2)],
        );
        let rule = Rule::new(h(vec![pattern("a")]), rhs);
        assert_eq!(replace(&mut state, &h(vec![Ex::int(0)]), &rule), Some(Ex::int(2)));
        assert!(!state.is_defined("Global`flag"));
    }

    #[test]
    fn test_commutative_replace_orderless() {
        let mut state = EvalState::new();
        state
            .set_attributes("Global`h", Attributes::new(&[Attribute::Orderless]))
            .unwrap();
        let (x, y, z) = globals!(x, y, z);
        let rule = Rule::new(h(vec![x.clone(), z.clone()]), Ex::global("w"));
        let e = h(vec![x.clone(), y.clone(), z.clone()]);
        let attrs = state.attributes_of("Global`h");
        let result = commutative_replace(&mut state, e.as_expr().unwrap(), &rule, attrs);
        assert_eq!(result, Some(h(vec![y, Ex::global("w")])));
    }

    #[test]
    fn test_commutative_replace_flat_windows() {
        let mut state = EvalState::new();
        state
            .set_attributes("Global`h", Attributes::new(&[Attribute::Flat]))
            .unwrap();
        let (a, b, x, y) = globals!(a, b, x, y);
        let rule = Rule::new(h(vec![a.clone(), b.clone()]), Ex::global("c"));
        let attrs = state.attributes_of("Global`h");
        let e = h(vec![x.clone(), a.clone(), b.clone(), y.clone()]);
        let result = commutative_replace(&mut state, e.as_expr().unwrap(), &rule, attrs);
        assert_eq!(result, Some(h(vec![x.clone(), Ex::global("c"), y.clone()])));
        // windows are contiguous
        let apart = h(vec![a, x, b, y]);
        assert_eq!(
            commutative_replace(&mut state, apart.as_expr().unwrap(), &rule, attrs),
            None
        );
    }

    #[test]
    fn test_commutative_replace_needs_attributes() {
        let mut state = EvalState::new();
        let (x, y, z) = globals!(x, y, z);
        let rule = Rule::new(h(vec![x.clone(), y.clone()]), z.clone());
        let e = h(vec![x, y, z]);
        let attrs = state.attributes_of("Global`h");
        assert_eq!(
            commutative_replace(&mut state, e.as_expr().unwrap(), &rule, attrs),
            None
        );
        assert_eq!(apply_rule(&mut state, e.as_expr().unwrap(), &rule, attrs), None);
    }

    #[test]
    fn test_replace_all_is_top_down_single_pass() {
        let mut state = EvalState::new();
        let (x, y) = globals!(x, y);
        // h[a_] -> h[h[a]]: the replacement is not visited again
        let a = Ex::global("a");
        let rule = Rule::new(h(vec![pattern("a")]), h(vec![h(vec![a])]));
        let result = replace_all(&mut state, &g(vec![h(vec![x.clone()]), y.clone()]), &[rule]);
        assert_eq!(result, g(vec![h(vec![h(vec![x.clone()])]), y.clone()]));

        // first matching rule wins
        let rules = vec![Rule::new(x.clone(), Ex::int(1)), Rule::new(x.clone(), Ex::int(2))];
        assert_eq!(replace_all(&mut state, &g(vec![x]), &rules), g(vec![Ex::int(1)]));
    }

    #[test]
    fn test_replace_all_leaves_result_unevaluated() {
        let mut state = EvalState::new();
        let x = Ex::global("x");
        let sum = Ex::call("Plus", vec![x.clone(), Ex::int(1)]);
        let result = replace_all(&mut state, &sum, &[Rule::new(x, Ex::int(1))]);
        assert_eq!(result, Ex::call("Plus", vec![Ex::int(1), Ex::int(1)]));
    }

    #[test]
    fn test_replace_repeated_flattens() {
        let mut state = EvalState::new();
        let (a, b, c, x, y) = globals!(a, b, c, x, y);
        let rule = Rule::new(
            h(vec![
                pattern_null_seq("a"),
                h(vec![pattern_seq("b")]),
                pattern_null_seq("c"),
            ]),
            h(vec![a, b, c]),
        );
        let nested = h(vec![x.clone(), h(vec![y.clone(), h(vec![Ex::int(1)])])]);
        let flat = replace_repeated(&mut state, &nested, &[rule]);
        assert_eq!(flat, h(vec![x, y, Ex::int(1)]));
    }

    #[test]
    fn test_replace_repeated_stops_at_iteration_limit() {
        let config = EvalConfig {
            max_iterations: 5,
            ..EvalConfig::default()
        };
        let mut state = EvalState::with_config(config);
        let x = Ex::global("x");
        // x -> g[x] never reaches a fixed point
        let rule = Rule::new(x.clone(), g(vec![x.clone()]));
        let mut expected = x.clone();
        for _ in 0..5 {
            expected = g(vec![expected]);
        }
        assert_eq!(replace_repeated(&mut state, &x, &[rule]), expected);
    }
}
