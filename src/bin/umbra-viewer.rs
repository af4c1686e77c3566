use umbra::app::Viewer;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut viewer = Viewer::new().with_title("Umbra Viewer");
    if let Some(path) = std::env::args_os().nth(1) {
        viewer = viewer.with_scene_file(path);
    }
    viewer.run()?;
    Ok(())
}
