use crate::globals;
use crate::symbolic::attributes::{Attribute, Attributes};
use crate::symbolic::eval_state::EvalState;
use crate::symbolic::pattern_matcher::{
    Binding, Bindings, EqualResult, all_matches, blank, blank_seq, condition, is_equal, match_q,
    matches, named, optional, pattern, pattern_null_seq, pattern_seq, typed_blank,
};
use crate::symbolic::symbolic_engine::Ex;
//___________________________________TESTS____________________________________

mod tests {
    use super::*;

    fn f(args: Vec<Ex>) -> Ex {
        Ex::apply(Ex::global("f"), args)
    }

    fn single(b: &Bindings, name: &str) -> Ex {
        match b.get(&format!("Global`{}", name)) {
            Some(Binding::Single(ex)) => ex.clone(),
            other => panic!("{} is not a single binding: {:?}", name, other),
        }
    }

    fn sequence(b: &Bindings, name: &str) -> Vec<Ex> {
        match b.get(&format!("Global`{}", name)) {
            Some(Binding::Sequence(items)) => items.clone(),
            other => panic!("{} is not a sequence binding: {:?}", name, other),
        }
    }

    fn orderless_f(state: &mut EvalState) {
        state
            .set_attributes("Global`f", Attributes::new(&[Attribute::Orderless]))
            .unwrap();
    }

    #[test]
    fn test_literal_and_blank() {
        let mut state = EvalState::new();
        let (x, y) = globals!(x, y);
        assert!(match_q(&mut state, &x, &x));
        assert!(!match_q(&mut state, &x, &y));
        assert!(match_q(&mut state, &f(vec![x.clone()]), &blank()));
        let b = matches(&mut state, &f(vec![x.clone()]), &f(vec![pattern("a")]), &Bindings::new())
            .unwrap();
        assert_eq!(single(&b, "a"), x);
    }

    #[test]
    fn test_typed_blanks() {
        let mut state = EvalState::new();
        let integer = typed_blank(Ex::system("Integer"));
        let real = typed_blank(Ex::system("Real"));
        assert!(match_q(&mut state, &Ex::int(3), &integer));
        assert!(!match_q(&mut state, &Ex::float(3.0), &integer));
        assert!(match_q(&mut state, &Ex::float(3.0), &real));
        assert!(match_q(
            &mut state,
            &Ex::rational(1, 2).unwrap(),
            &typed_blank(Ex::system("Rational"))
        ));
        assert!(match_q(&mut state, &Ex::global("x"), &typed_blank(Ex::system("Symbol"))));
        let list = Ex::list(vec![Ex::int(1)]);
        assert!(match_q(&mut state, &list, &typed_blank(Ex::system("List"))));
        assert!(!match_q(&mut state, &list, &typed_blank(Ex::global("f"))));
    }

    #[test]
    fn test_repeated_name_must_agree() {
        let mut state = EvalState::new();
        let pat = f(vec![pattern("a"), pattern("a")]);
        assert!(match_q(&mut state, &f(vec![Ex::int(1), Ex::int(1)]), &pat));
        assert!(!match_q(&mut state, &f(vec![Ex::int(1), Ex::int(2)]), &pat));
    }

    #[test]
    fn test_orderless_match_of_unevaluated_term() {
        let mut state = EvalState::new();
        orderless_f(&mut state);
        let (x, y) = globals!(x, y);
        // f[x, b_] against f[y, x]: the literal x finds its partner out of position
        let target = f(vec![y.clone(), x.clone()]);
        let b = matches(&mut state, &target, &f(vec![x.clone(), pattern("b")]), &Bindings::new())
            .unwrap();
        assert_eq!(single(&b, "b"), y);
        // both assignments of f[a_, b_]
        let all = all_matches(&mut state, &target, &f(vec![pattern("a"), pattern("b")]));
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_positional_match_keeps_order() {
        let mut state = EvalState::new();
        let (x, y) = globals!(x, y);
        let target = f(vec![y, x.clone()]);
        assert!(!match_q(&mut state, &target, &f(vec![x, pattern("b")])));
    }

    #[test]
    fn test_sequence_backtracking() {
        let mut state = EvalState::new();
        let x = Ex::global("x");
        let target = f(vec![Ex::int(1), x.clone(), Ex::int(2), x.clone()]);
        let pat = f(vec![pattern_null_seq("a"), x.clone(), pattern_null_seq("b")]);
        let first = matches(&mut state, &target, &pat, &Bindings::new()).unwrap();
        assert_eq!(sequence(&first, "a"), vec![Ex::int(1)]);
        assert_eq!(sequence(&first, "b"), vec![Ex::int(2), x.clone()]);
        let all = all_matches(&mut state, &target, &pat);
        assert_eq!(all.len(), 2);
        assert_eq!(sequence(&all[1], "a"), vec![Ex::int(1), x.clone(), Ex::int(2)]);
        assert!(sequence(&all[1], "b").is_empty());
    }

    #[test]
    fn test_blank_sequence_needs_one_operand() {
        let mut state = EvalState::new();
        assert!(!match_q(&mut state, &f(vec![]), &f(vec![pattern_seq("s")])));
        assert!(match_q(&mut state, &f(vec![]), &f(vec![pattern_null_seq("s")])));
        assert!(match_q(
            &mut state,
            &f(vec![Ex::int(1), Ex::int(2)]),
            &f(vec![named("s", blank_seq())])
        ));
        let typed = f(vec![named("s", Ex::call("BlankSequence", vec![Ex::system("Integer")]))]);
        assert!(match_q(&mut state, &f(vec![Ex::int(1), Ex::int(2)]), &typed));
        assert!(!match_q(&mut state, &f(vec![Ex::int(1), Ex::global("x")]), &typed));
    }

    #[test]
    fn test_flat_orderless_sequence() {
        let mut state = EvalState::new();
        let (a, b, c) = globals!(a, b, c);
        // Plus[a, Plus[b, c]] unevaluated: nested sums flatten before matching
        let target = Ex::call(
            "Plus",
            vec![a.clone(), Ex::call("Plus", vec![b.clone(), c.clone()])],
        );
        let pat = Ex::call("Plus", vec![a.clone(), pattern_seq("r")]);
        let found = matches(&mut state, &target, &pat, &Bindings::new()).unwrap();
        assert_eq!(sequence(&found, "r"), vec![b, c]);
    }

    #[test]
    fn test_flat_positional_flattening() {
        let mut state = EvalState::new();
        state
            .set_attributes("Global`f", Attributes::new(&[Attribute::Flat]))
            .unwrap();
        let (a, b, c) = globals!(a, b, c);
        // f[f[a, b], c] against f[p_, q_, r_] with f Flat but positional
        let nested = f(vec![f(vec![a.clone(), b.clone()]), c.clone()]);
        let pat = f(vec![pattern("p"), pattern("q"), pattern("r")]);
        let found = matches(&mut state, &nested, &pat, &Bindings::new()).unwrap();
        assert_eq!(single(&found, "p"), a);
        assert_eq!(single(&found, "q"), b);
        assert_eq!(single(&found, "r"), c.clone());
        // order still matters without Orderless
        let swapped = f(vec![pattern("p"), pattern("q"), a.clone()]);
        assert!(!match_q(&mut state, &nested, &swapped));
    }

    #[test]
    fn test_optional_with_one_identity() {
        let mut state = EvalState::new();
        let (x, y) = globals!(x, y);
        let symbol = typed_blank(Ex::system("Symbol"));
        let pat = Ex::call("Times", vec![optional(pattern("c")), named("u", symbol)]);
        // a lone symbol: c takes the default of Times
        let lone = matches(&mut state, &x, &pat, &Bindings::new()).unwrap();
        assert_eq!(single(&lone, "c"), Ex::int(1));
        assert_eq!(single(&lone, "u"), x);
        let product = Ex::call("Times", vec![Ex::int(3), y.clone()]);
        let found = all_matches(&mut state, &product, &pat);
        assert_eq!(found.len(), 1);
        assert_eq!(single(&found[0], "c"), Ex::int(3));
        assert_eq!(single(&found[0], "u"), y);
    }

    #[test]
    fn test_optional_with_explicit_default() {
        let mut state = EvalState::new();
        let pat = f(vec![
            pattern("a"),
            Ex::call("Optional", vec![pattern("b"), Ex::int(7)]),
        ]);
        let found = matches(&mut state, &f(vec![Ex::int(1)]), &pat, &Bindings::new()).unwrap();
        assert_eq!(single(&found, "b"), Ex::int(7));
        let found = matches(&mut state, &f(vec![Ex::int(1), Ex::int(2)]), &pat, &Bindings::new())
            .unwrap();
        assert_eq!(single(&found, "b"), Ex::int(2));
        // no default anywhere: the operand is required
        let bare = f(vec![pattern("a"), optional(pattern("b"))]);
        assert!(!match_q(&mut state, &f(vec![Ex::int(1)]), &bare));
    }

    #[test]
    fn test_condition_and_alternatives() {
        let mut state = EvalState::new();
        let n = Ex::global("n");
        let nonzero = condition(
            named("n", typed_blank(Ex::system("Integer"))),
            Ex::call("Not", vec![Ex::call("SameQ", vec![n, Ex::int(0)])]),
        );
        assert!(match_q(&mut state, &Ex::int(5), &nonzero));
        assert!(!match_q(&mut state, &Ex::int(0), &nonzero));
        assert!(!match_q(&mut state, &Ex::float(5.0), &nonzero));

        let (x, y, z) = globals!(x, y, z);
        let either = Ex::call("Alternatives", vec![y.clone(), x.clone()]);
        assert!(match_q(&mut state, &x, &either));
        assert!(!match_q(&mut state, &z, &either));
    }

    #[test]
    fn test_hold_pattern() {
        let mut state = EvalState::new();
        let (x, y) = globals!(x, y);
        let held = Ex::call(
            "HoldPattern",
            vec![Ex::call("Plus", vec![pattern("a"), pattern("b")])],
        );
        let target = Ex::call("Plus", vec![x, y]);
        assert!(match_q(&mut state, &target, &held));
    }

    #[test]
    fn test_condition_assignments_are_rolled_back() {
        let mut state = EvalState::new();
        let flag = Ex::global("flag");
        let test = Ex::call(
            "CompoundExpression",
            vec![Ex::call("Set", vec![flag, Ex::int(1)]), Ex::bool(true)],
        );
        let pat = condition(pattern("a"), test);
        assert!(match_q(&mut state, &Ex::int(3), &pat));
        assert_eq!(state.own_value("Global`flag"), None);
    }

    #[test]
    fn test_seeded_bindings_constrain_the_match() {
        let mut state = EvalState::new();
        let mut seed = Bindings::new();
        seed.insert("Global`a".to_string(), Binding::Single(Ex::int(2)));
        let pat = f(vec![pattern("a")]);
        assert!(matches(&mut state, &f(vec![Ex::int(2)]), &pat, &seed).is_some());
        assert!(matches(&mut state, &f(vec![Ex::int(3)]), &pat, &seed).is_none());
    }

    #[test]
    fn test_binding_to_ex() {
        let seq = Binding::Sequence(vec![Ex::int(1), Ex::int(2)]);
        assert_eq!(seq.to_ex(), Ex::call("Sequence", vec![Ex::int(1), Ex::int(2)]));
        assert_eq!(Binding::Single(Ex::int(1)).to_ex(), Ex::int(1));
    }

    #[test]
    fn test_is_equal() {
        let mut state = EvalState::new();
        let (x, y, z) = globals!(x, y, z);
        assert_eq!(is_equal(&mut state, &Ex::int(1), &Ex::float(1.0)), EqualResult::True);
        assert_eq!(is_equal(&mut state, &Ex::int(1), &Ex::int(2)), EqualResult::False);
        assert_eq!(is_equal(&mut state, &x, &y), EqualResult::Unknown);
        assert_eq!(
            is_equal(&mut state, &Ex::bool(true), &Ex::bool(false)),
            EqualResult::False
        );
        // operands of an Orderless head compare as multisets, whatever the input order
        let p1 = Ex::call("Times", vec![x.clone(), y.clone(), z.clone(), Ex::int(2)]);
        let p2 = Ex::call("Times", vec![Ex::int(2), z.clone(), y.clone(), x.clone()]);
        assert_eq!(is_equal(&mut state, &p1, &p2), EqualResult::True);
        let g1 = Ex::apply(Ex::global("g"), vec![x.clone(), y.clone()]);
        let g2 = Ex::apply(Ex::global("g"), vec![y, x]);
        assert_eq!(is_equal(&mut state, &g1, &g2), EqualResult::Unknown);
    }
}
