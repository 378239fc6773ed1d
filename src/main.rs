mod demo_scenes;

fn main() {
    if let Err(err) = wgpu_instancing::run(demo_scenes::build) {
        eprintln!("Application error: {err}");
    }
}
