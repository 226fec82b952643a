#![allow(non_snake_case)]
use RustedReduce::Examples::rewrite_examples::rewrite_examples;

fn main() {
    let example = 1;
    match example {
        0..=4 => rewrite_examples(example),
        _ => {
            for i in 0..=4 {
                println!("\n========== example {} ==========", i);
                rewrite_examples(i);
            }
        }
    }
}
