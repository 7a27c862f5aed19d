use sph_core::controller::ControllerState;
use sph_core::{Config, Cuboid, SceneController, SceneDescriptor};

fn scene(name: &str) -> SceneDescriptor {
    let space = Cuboid::new(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0);
    let source = Cuboid::new(-0.3, 0.3, -0.3, 0.3, -0.3, 0.3);
    SceneDescriptor::new(name, space, vec![source]).unwrap()
}

#[test]
fn full_lifecycle_runs_several_frames_then_reloads_a_new_scene() {
    // Controller transitions emit `log::info!`/`log::error!` records;
    // surface them under `RUST_LOG=info cargo test -- --nocapture`.
    let _ = env_logger::try_init();

    let mut controller = SceneController::new(Config::default());
    let first = controller.registry_mut().register(scene("dam break"));
    controller.request_scene_change(first);

    assert_eq!(controller.state(), ControllerState::Idle);
    controller.tick().unwrap();
    assert_eq!(controller.state(), ControllerState::AppInit);
    controller.tick().unwrap();
    assert_eq!(controller.state(), ControllerState::SimInit);
    controller.tick().unwrap();
    assert_eq!(controller.state(), ControllerState::SimRun);

    for _ in 0..20 {
        controller.tick().unwrap();
        assert_eq!(controller.state(), ControllerState::SimRun);
    }
    assert!(controller.particle_system().unwrap().particles().len() > 0);

    let second = controller.registry_mut().register(scene("droplet fall"));
    controller.request_scene_change(second);
    controller.tick().unwrap();
    assert_eq!(controller.state(), ControllerState::SimTerm);
    controller.tick().unwrap();
    assert_eq!(controller.state(), ControllerState::SimInit);
    controller.tick().unwrap();
    assert_eq!(controller.state(), ControllerState::SimRun);
    assert_eq!(controller.registry().current_scene_id(), Some(second));
}
