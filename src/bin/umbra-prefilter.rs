use std::path::PathBuf;
use std::process::ExitCode;

use umbra::errors::UmbraError;
use umbra::ibl::prefilter_environment;

const USAGE: &str = "usage: umbra-prefilter <input-environment> <output-directory> <sky-intensity>";

fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [input, output, intensity] = args.as_slice() else {
        eprintln!("{USAGE}");
        return Ok(ExitCode::FAILURE);
    };
    let intensity: f32 = intensity
        .parse()
        .map_err(|_| UmbraError::InvalidArgument(format!("sky intensity '{intensity}' is not a number")))?;

    prefilter_environment(&PathBuf::from(input), &PathBuf::from(output), intensity)?;
    log::info!("Prefiltered environment written to {output}");
    Ok(ExitCode::SUCCESS)
}
