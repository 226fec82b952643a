// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_snake_case)]

use crate::Utils::logger::init_logger;
use crate::globals;
use crate::symbolic::attributes::{Attribute, Attributes};
use crate::symbolic::eval_config::EvalConfig;
use crate::symbolic::eval_state::EvalState;
use crate::symbolic::pattern_matcher::{
    all_matches, optional, pattern, pattern_null_seq, pattern_seq,
};
use crate::symbolic::rewrite::Rule;
use crate::symbolic::symbolic_engine::{Ex, Form};
use log::info;

#[allow(dead_code)]
pub fn rewrite_examples(example: usize) {
    match example {
        0 => {
            // ARITHMETIC NORMAL FORMS
            let mut state = EvalState::new();
            let (x, y) = globals!(x, y);
            // float contagion: 2 * 3.0 = 6.
            let product = Ex::call("Times", vec![Ex::int(2), Ex::float(3.0)]);
            println!("{} = {}", product, state.evaluate(&product));
            // literal one and zero
            let with_one = Ex::call("Times", vec![x.clone(), Ex::int(1)]);
            println!("{} = {}", with_one, state.evaluate(&with_one));
            let with_zero = Ex::call("Times", vec![y.clone(), Ex::int(0)]);
            println!("{} = {}", with_zero, state.evaluate(&with_zero));
            // sign normal form
            let negated = Ex::call(
                "Times",
                vec![Ex::int(-1), Ex::call("Plus", vec![x.clone(), y.clone()])],
            );
            println!("{} = {}", negated, state.evaluate(&negated));
            // rational from a division shape
            let ratio = Ex::call(
                "Times",
                vec![Ex::int(3), Ex::call("Power", vec![Ex::int(4), Ex::int(-1)])],
            );
            let result = state.evaluate(&ratio);
            println!(
                "{} = {} (FullForm {})",
                ratio,
                result,
                state.string_form(&result, Form::FullForm)
            );
            let factorial = Ex::call("Factorial", vec![Ex::int(20)]);
            println!("{} = {}", factorial, state.evaluate(&factorial));
        }
        1 => {
            // ORDERLESS RULES
            let mut state = EvalState::new();
            let f = Ex::global("f");
            state
                .set_attributes("Global`f", Attributes::new(&[Attribute::Orderless]))
                .unwrap();
            // f[a_, b_] :> g[a, b]
            let rule = Rule::new(
                Ex::apply(f.clone(), vec![pattern("a"), pattern("b")]),
                Ex::apply(Ex::global("g"), vec![Ex::global("a"), Ex::global("b")]),
            );
            let (x, y, z) = globals!(x, y, z);
            let target = Ex::apply(f.clone(), vec![y.clone(), x.clone()]);
            for bindings in all_matches(&mut state, &target, &rule.lhs) {
                println!("{} matches {} with {:?}", target, rule.lhs, bindings);
            }
            // the rule as a down value of f: applied to a sub-multiset of f[x, y, z]
            state.add_down_value("Global`f", rule).unwrap();
            let three = Ex::apply(f, vec![z, y, x]);
            println!("{} = {}", three, state.evaluate(&three));
        }
        2 => {
            // DEFINITIONS THROUGH Set AND SetDelayed
            let mut state = EvalState::new();
            let fib = Ex::global("fib");
            let n = Ex::global("n");
            let call = |arg: Ex| Ex::apply(fib.clone(), vec![arg]);
            state.evaluate(&Ex::call("Set", vec![call(Ex::int(0)), Ex::int(0)]));
            state.evaluate(&Ex::call("Set", vec![call(Ex::int(1)), Ex::int(1)]));
            // fib[n_] := fib[n - 1] + fib[n - 2]
            let recursion = Ex::call(
                "Plus",
                vec![
                    call(Ex::call("Plus", vec![n.clone(), Ex::int(-1)])),
                    call(Ex::call("Plus", vec![n.clone(), Ex::int(-2)])),
                ],
            );
            state.evaluate(&Ex::call("SetDelayed", vec![call(pattern("n")), recursion]));
            for k in [5, 10, 15] {
                let value = state.evaluate(&call(Ex::int(k)));
                println!("fib[{}] = {}", k, value);
            }
        }
        3 => {
            // OPTIONAL PATTERNS AND ReplaceRepeated
            let mut state = EvalState::new();
            let (x, y) = globals!(x, y);
            // Times[c_., u_] binds c = 1 on a lone symbol
            let scaled = Ex::call("Times", vec![optional(pattern("c")), pattern("u")]);
            for target in [x.clone(), Ex::call("Times", vec![Ex::int(3), y.clone()])] {
                for bindings in all_matches(&mut state, &target, &scaled) {
                    println!("{} matches {} with {:?}", target, scaled, bindings);
                }
            }
            // flatten nested h[...] with h[a___, h[b__], c___] -> h[a, b, c]
            let h = Ex::global("h");
            let rule = Ex::call(
                "Rule",
                vec![
                    Ex::apply(
                        h.clone(),
                        vec![
                            pattern_null_seq("a"),
                            Ex::apply(h.clone(), vec![pattern_seq("b")]),
                            pattern_null_seq("c"),
                        ],
                    ),
                    Ex::apply(
                        h.clone(),
                        vec![Ex::global("a"), Ex::global("b"), Ex::global("c")],
                    ),
                ],
            );
            let nested = Ex::apply(
                h.clone(),
                vec![
                    x.clone(),
                    Ex::apply(h.clone(), vec![y.clone(), Ex::apply(h, vec![Ex::int(1)])]),
                ],
            );
            let flat = state.evaluate(&Ex::call("ReplaceRepeated", vec![nested.clone(), rule]));
            println!("{} //. flatten = {}", nested, flat);
        }
        4 => {
            // SESSION FROM A CONFIGURATION DOCUMENT
            let document = "evaluation\n\
                            max_iterations: 64\n\
                            max_recursion_depth: 128\n\
                            logging\n\
                            loglevel: debug\n";
            let config = EvalConfig::parse(document).unwrap();
            init_logger(&config.loglevel, config.log_file.as_deref()).unwrap();
            info!("session configuration: {:?}", config);
            let mut state = EvalState::with_config(config);
            let x = Ex::global("x");
            let listable = Ex::call(
                "Sin",
                vec![Ex::list(vec![Ex::float(0.5), x.clone(), Ex::int(2)])],
            );
            println!("{} = {}", listable, state.evaluate(&listable));
        }
        _ => {
            println!("example {} does not exist", example);
        }
    }
}
