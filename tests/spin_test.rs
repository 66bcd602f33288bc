use cgmath::{Vector2, Vector3};
use pixel_book::{
    animation::{InteractionMode, Spin},
    camera::OrbitController,
    config::AppConfig,
};

fn default_spin() -> Spin {
    Spin::from(&AppConfig::default().book)
}

fn relative_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance * b.abs().max(f64::MIN_POSITIVE)
}

#[test]
fn velocity_decays_geometrically() {
    let mut spin = default_spin();
    let mut rotation = Vector3::new(0.0, 0.0, 0.0);
    for frames in [1u32, 10, 100, 1000] {
        let mut s = spin.clone();
        let mut r = rotation;
        s.advance(&mut r, frames, InteractionMode::Idle);
        let expected = 0.005 * 0.999f64.powi(frames as i32);
        assert!(
            relative_eq(s.velocity.y as f64, expected, 1e-3),
            "after {frames} frames: {} != {expected}",
            s.velocity.y
        );
        assert_eq!(s.velocity.x, 0.0);
    }
    spin.tick(&mut rotation, InteractionMode::Idle);
    assert_eq!(rotation.y, 0.005);
}

#[test]
fn rotation_is_the_geometric_series_of_the_velocity() {
    let mut spin = Spin::new(Vector2::new(0.002, 0.005), 0.999);
    let mut rotation = Vector3::new(0.0, 0.0, 0.0);
    let frames = 500;
    spin.advance(&mut rotation, frames, InteractionMode::Idle);
    let series = (1.0 - 0.999f64.powi(frames as i32)) / (1.0 - 0.999);
    assert!(relative_eq(rotation.x as f64, 0.002 * series, 1e-3));
    assert!(relative_eq(rotation.y as f64, 0.005 * series, 1e-3));
    assert_eq!(rotation.z, 0.0);
}

#[test]
fn first_idle_frame_matches_the_configured_constants() {
    let config = AppConfig::default();
    let mut spin = default_spin();
    let mut rotation: Vector3<f32> = config.book.rotation.into();
    let before = rotation;
    spin.tick(&mut rotation, InteractionMode::Idle);
    assert!((rotation.y - before.y - 0.005).abs() < 1e-6);
    assert_eq!(rotation.x, before.x);
    assert!((spin.velocity.y - 0.004995).abs() < 1e-8);
}

#[test]
fn dragging_holds_the_book_still() {
    let mut controller = OrbitController::from(&AppConfig::default().controls);
    let mut spin = default_spin();
    let mut rotation = Vector3::new(0.3, 0.5, 0.0);

    controller.start_drag();
    let mode = InteractionMode::from_dragging(controller.is_dragging());
    assert_eq!(mode, InteractionMode::UserControlled);
    for _ in 0..5000 {
        assert!(!spin.tick(&mut rotation, mode));
    }
    assert_eq!(rotation, Vector3::new(0.3, 0.5, 0.0));
    assert_eq!(spin.velocity, Vector2::new(0.0, 0.005));

    controller.end_drag();
    let mode = InteractionMode::from_dragging(controller.is_dragging());
    assert_eq!(mode, InteractionMode::Idle);
    assert!(spin.tick(&mut rotation, mode));
    assert!(rotation.y > 0.5);
}
