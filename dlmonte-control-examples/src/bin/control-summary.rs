use anyhow::{Result, anyhow, Context};

use dlmonte_control::{control::EnsembleParameters, parser::SampleKind};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let input_file = std::env::args().nth(1).ok_or(anyhow!("Usage: control-summary <CONTROL>"))?;
    let source = std::fs::read_to_string(&input_file)
        .with_context(|| format!("Cannot read {}", input_file))?;
    let doc = dlmonte_control::parse(&source)?;

    println!("Title:    {}", doc.title);
    println!("Ensemble: {}", doc.ensemble());
    // Parameters need temperature (and pressure for NPT), report rather than fail
    match doc.ensemble_parameters() {
        Ok(EnsembleParameters::Nvt { temperature }) => println!("T = {}", temperature),
        Ok(EnsembleParameters::Npt { temperature, pressure }) => println!("T = {}, P = {}", temperature, pressure),
        Ok(EnsembleParameters::MuVt { temperature, activities }) => {
            println!("T = {}", temperature);
            for (species, activity) in activities {
                println!("  activity of {}: {}", species, activity);
            }
        }
        Err(err) => println!("Parameters unavailable: {}", err),
    }
    if let Some(steps) = doc.main_block.steps() {
        println!("Steps:    {}", steps);
    }
    for mv in doc.main_block.moves() {
        println!("Move:     {} ({} movers, {}%)", mv.kind(), mv.mover_count(), mv.probability());
    }
    if doc.main_block.samples().contains_key(&SampleKind::Rdfs) {
        println!("Samples RDFs");
    }
    if let Some(fed) = doc.use_block.fed() {
        println!("FED:      method {:?}, order parameter {:?}",
            fed.method.as_ref().map(|m| m.tag()), fed.order_parameter.as_ref().map(|o| o.name()));
    }

    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
