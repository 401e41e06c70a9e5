use dicer_expr::DiceEvaluator;

pub fn run(expr: &str, evaluator: &DiceEvaluator) -> Result<(), String> {
    let range = evaluator.range(expr).map_err(|e| e.to_string())?;
    println!("[{}, {}]", range.min, range.max);
    Ok(())
}
