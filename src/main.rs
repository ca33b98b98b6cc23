use glam::{Quat, Vec3};
use hybrid_bvh::raytracer::{
    GpuContext, Light, PointLight, Primitive, RenderError, Scene, SceneBuffers, Settings,
    Transform,
};
use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn make_scene(settings: &Settings) -> Scene {
    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut scene = Scene::with_random_spheres(settings.sphere_count, &mut rng);

    // Room around the sphere shell
    scene.add_box(Vec3::ZERO, Vec3::splat(60.0), Vec3::new(0.8, 0.8, 0.8));

    let tetrahedron = [
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(-1.0, -1.0, 1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(1.0, -1.0, -1.0),
    ];
    let faces = [[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]];
    let primitives = faces
        .iter()
        .map(|&face| Primitive::new(face.map(|i| tetrahedron[i]), 0))
        .collect();
    scene.add_object(
        Transform::new(
            Vec3::new(0.0, 0.0, -10.0),
            Quat::from_rotation_y(0.5),
            Vec3::splat(3.0),
        ),
        primitives,
    );

    scene.add_light(Light::new(
        [
            Vec3::new(-5.0, 59.0, -5.0),
            Vec3::new(5.0, 59.0, -5.0),
            Vec3::new(0.0, 59.0, 5.0),
        ],
        Vec3::splat(10.0),
    ));
    scene.add_point_light(PointLight::new(Vec3::new(0.0, 0.0, 20.0), Vec3::new(1.0, 0.9, 0.7)));
    scene.add_point_light(PointLight::new(Vec3::new(20.0, 10.0, 0.0), Vec3::new(0.4, 0.6, 1.0)));

    scene
}

async fn run(settings: Settings) -> anyhow::Result<()> {
    let scene = make_scene(&settings);
    let bvh = scene.build_bvh()?;
    info!(
        "Built scene BVH: {} shapes, {} objects, {} nodes total",
        scene.shapes.len(),
        scene.objects.len(),
        bvh.node_count()
    );

    let context = match GpuContext::new().await {
        Ok(context) => context,
        Err(RenderError::NoAdapter) => {
            warn!("No GPU adapter available, skipping upload");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    match SceneBuffers::upload(&context, &scene, &bvh, settings.node_capacity) {
        Ok(buffers) => {
            info!(
                "Shape node buffer holds {}/{} records",
                buffers.shapes.len(),
                buffers.shapes.capacity()
            );
            Ok(())
        }
        Err(e) => {
            error!("Scene rejected: {e}");
            Err(e.into())
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let settings = Settings::from_env();
    info!("{settings:?}");

    pollster::block_on(run(settings))
}
