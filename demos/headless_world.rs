use glam::{Affine3A, Quat, Vec2, Vec3, Vec4};
use smallvec::smallvec;

use umbra::controller::BoneWeight;
use umbra::render::Program;
use umbra::scene::camera::camera_look_transform;
use umbra::{
    FogNode, FrustumCamera, GeometryNode, LightController, LightNode, Node, OccluderNode,
    RecordingDevice, SkinController, Triangle, Vertex, World, WorldSettings,
};

/// Headless world demo
///
/// Builds a small lit scene with an occluding wall, a revolving light and a
/// skinned strip, runs a few frames against the recording device and logs
/// what each frame drew. Run with `RUST_LOG=debug` to see per-frame output.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut device = RecordingDevice::new(Vec2::new(1280.0, 720.0));
    let mut world = World::new(WorldSettings {
        ambient_color: Vec4::new(0.05, 0.05, 0.08, 1.0),
        ..Default::default()
    });
    let root = world.root();

    let ambient = Program::compile(&mut device, &["ambient.vs"], &["ambient.fs"])?;
    let lit = Program::compile(&mut device, &["light.vs"], &["light.fs"])?;

    // 1. Camera
    world.add_node(
        root,
        Node::camera(
            "camera",
            FrustumCamera::from_fov(60f32.to_radians(), 1280.0 / 720.0, 0.1),
        )
        .with_transform(camera_look_transform(Vec3::new(0.0, 3.0, 20.0), Vec3::ZERO, Vec3::Y)),
    )?;

    // 2. Geometry: a row of balls, one of them hidden behind a wall
    for (i, x) in [-6.0f32, 0.0, 6.0].into_iter().enumerate() {
        let mut ball = GeometryNode::sphere(&mut device, 1.0)?;
        ball.renderable.set_program(0, Some(ambient.clone()));
        ball.renderable.set_program(1, Some(lit.clone()));
        world.add_node(root, Node::geometry(format!("ball{i}"), ball).with_translation(Vec3::new(x, 0.0, -5.0)))?;
    }
    let mut floor = GeometryNode::cuboid(&mut device, Vec3::new(40.0, 0.5, 40.0))?;
    floor.renderable.set_program(0, Some(ambient.clone()));
    floor.renderable.set_program(1, Some(lit.clone()));
    world.add_node(root, Node::geometry("floor", floor).with_translation(Vec3::new(-20.0, -1.5, -30.0)))?;

    world.add_node(
        root,
        Node::occluder("wall", OccluderNode::new(Vec3::new(2.0, 2.0, 0.1))).with_translation(Vec3::new(0.0, 0.0, 2.0)),
    )?;

    // 3. Lights: one revolving point light and a sun
    let lamp = world.add_node(
        root,
        Node::light("lamp", LightNode::point(Vec4::new(1.0, 0.8, 0.6, 1.0), 15.0))
            .with_translation(Vec3::new(8.0, 2.0, 0.0)),
    )?;
    world.attach_controller(LightController::new(lamp, Vec3::Y))?;
    world.add_node(
        root,
        Node::light("sun", LightNode::infinite(Vec4::ONE)).with_rotation(Quat::from_rotation_x(-1.0)),
    )?;

    world.add_node(
        root,
        Node::fog("fog", FogNode::new(Vec4::new(0.6, 0.6, 0.7, 1.0), 0.02))
            .with_translation(Vec3::new(0.0, -1.0, 0.0)),
    )?;

    // 4. Skinned strip bent by one bone
    let strip = skinned_strip(&mut device, ambient.clone())?;
    let strip = world.add_node(root, Node::geometry("strip", strip).with_translation(Vec3::new(-3.0, 3.0, 0.0)))?;
    let base = world.add_node(strip, Node::bone("base"))?;
    let tip = world.add_node(base, Node::bone("tip").with_translation(Vec3::new(1.0, 0.0, 0.0)))?;
    world.attach_controller(SkinController::new(
        strip,
        vec![base, tip],
        vec![Affine3A::IDENTITY, Affine3A::from_translation(Vec3::new(-1.0, 0.0, 0.0))],
        vec![
            smallvec![BoneWeight { bone: 0, weight: 1.0 }],
            smallvec![BoneWeight { bone: 0, weight: 1.0 }],
            smallvec![BoneWeight { bone: 0, weight: 0.5 }, BoneWeight { bone: 1, weight: 0.5 }],
            smallvec![BoneWeight { bone: 0, weight: 0.5 }, BoneWeight { bone: 1, weight: 0.5 }],
            smallvec![BoneWeight { bone: 1, weight: 1.0 }],
            smallvec![BoneWeight { bone: 1, weight: 1.0 }],
        ],
    )?)?;

    world.preprocess_world();

    // 5. Frames
    for frame in 0..5 {
        device.clear_frame();
        if let Some(node) = world.node_mut(tip) {
            node.transform.matrix3 = Affine3A::from_rotation_z(0.2 * frame as f32).matrix3;
        }

        let stats = world.render_world(&mut device, 1.0 / 60.0);
        log::info!(
            "Frame {frame}: {} ambient draws, {} light draws from {} lights, {} occluded, {} draw calls recorded",
            stats.ambient_draw_count,
            stats.light_draw_count,
            stats.light_source_count,
            stats.occluded_count,
            device.draws().len()
        );
    }

    if let Some(lamp) = world.node(lamp) {
        log::info!("Lamp ended at {:?}", lamp.world_position());
    }
    Ok(())
}

/// Two-segment strip along +x, three vertex pairs at x = 0, 1, 2.
fn skinned_strip(
    device: &mut RecordingDevice,
    program: std::sync::Arc<Program>,
) -> umbra::Result<GeometryNode> {
    let mut vertices = Vec::new();
    for x in 0..3 {
        for y in [0.0, 0.25] {
            vertices.push(Vertex::new(
                [x as f32, y, 0.0],
                [0.0, 0.0, 1.0],
                [1.0, 0.0, 0.0, 1.0],
                [x as f32 * 0.5, y * 4.0],
            ));
        }
    }
    let triangles = vec![
        Triangle::new(0, 2, 1),
        Triangle::new(1, 2, 3),
        Triangle::new(2, 4, 3),
        Triangle::new(3, 4, 5),
    ];

    let mut strip = GeometryNode::mesh(device, vertices, triangles)?;
    strip.renderable.set_cull_face(false);
    strip.renderable.set_program(0, Some(program));
    Ok(strip)
}
