use dicer_expr::{DiceEvaluator, RandRoller};

pub fn run(expr: &str, evaluator: &DiceEvaluator, seed: Option<u64>) -> Result<(), String> {
    let mut roller = RandRoller::from_seed_option(seed);
    let evaluation = evaluator
        .parse(expr, &mut roller)
        .map_err(|e| e.to_string())?;
    println!("{evaluation}");
    Ok(())
}
