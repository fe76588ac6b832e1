use imrisim::{Scenario, ScenarioConfig};

use anyhow::Result;
use clap::Parser;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short, default_value = "binary.yaml")]
    file_name: String,
}

// load here to keep main clean
fn load_scenario_from_yaml() -> Result<ScenarioConfig> {
    let args = Args::parse();
    let file_name = args.file_name;

    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(&file_name);
    let file = File::open(&config_path)?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig = serde_yaml::from_reader(reader)?;

    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    env_logger::init();

    let scenario_cfg = load_scenario_from_yaml()?;
    let Scenario {
        mut sim,
        dt,
        t_end,
        n_save,
        n_update,
    } = Scenario::build(scenario_cfg)?;

    let (a_i, e_i) = sim.system.orbital_elements(sim.forces.g);
    println!("initial orbit: a = {a_i}, e = {e_i}");

    sim.run(dt, t_end, n_save, n_update)?;

    let (a_f, e_f) = sim.system.orbital_elements(sim.forces.g);
    println!("final orbit:   a = {a_f}, e = {e_f}");
    println!(
        "drift: da/a = {:.3e}, de = {:.3e}",
        (a_f - a_i) / a_i,
        e_f - e_i
    );

    Ok(())
}
