//! Built-in scenes.

use crate::{LoadedScene, SceneBuilder, SceneError, SceneResult};
use glint_math::Vec3;
use glint_renderer::{Camera, Color, Material, DEFAULT_GLASS_ETA};

/// Unit square in the y = 0 plane, facing +y.
const UNIT_SQUARE: [Vec3; 4] = [
    Vec3::new(-0.5, 0.0, 0.5),
    Vec3::new(0.5, 0.0, 0.5),
    Vec3::new(0.5, 0.0, -0.5),
    Vec3::new(-0.5, 0.0, -0.5),
];
const UNIT_SQUARE_TRIANGLES: [[u32; 3]; 2] = [[0, 1, 3], [1, 2, 3]];

/// Total power emitted by the ceiling light.
pub const CORNELL_LIGHT_POWER: f32 = 20.0;

fn square(
    builder: &mut SceneBuilder,
    material: &str,
    place: impl FnOnce(&mut SceneBuilder) -> SceneResult<()>,
) -> SceneResult<()> {
    builder.push_attributes();
    builder.push_matrix();
    builder.set_material(material)?;
    place(builder)?;
    builder.mesh(&UNIT_SQUARE, &UNIT_SQUARE_TRIANGLES)?;
    builder.pop_matrix()?;
    builder.pop_attributes()
}

/// The Cornell box: a 2x2x2 room with a red left wall, a green right wall, a
/// diffuse sphere, a glass sphere and a square light under the ceiling.
pub fn cornell_box(width: u32, height: u32) -> SceneResult<LoadedScene> {
    if width == 0 || height == 0 {
        return Err(SceneError::EmptyImage { width, height });
    }

    let mut builder = SceneBuilder::new();

    let light_side = 0.5;
    builder.material("red", Material::matte(Color::new(0.8, 0.1, 0.1)))?;
    builder.material("green", Material::matte(Color::new(0.1, 0.8, 0.1)))?;
    builder.material("white", Material::matte(Color::new(0.8, 0.8, 0.8)))?;
    builder.material("glass", Material::glass(Color::ONE, Color::ONE, DEFAULT_GLASS_ETA))?;
    builder.material(
        "light",
        Material::light(Color::splat(CORNELL_LIGHT_POWER / (light_side * light_side))),
    )?;

    // back wall
    square(&mut builder, "white", |b| {
        b.translate(Vec3::new(0.0, 0.0, -1.0));
        b.rotate(90.0, Vec3::X)?;
        b.scale(Vec3::splat(2.0));
        Ok(())
    })?;
    // floor
    square(&mut builder, "white", |b| {
        b.translate(Vec3::new(0.0, -1.0, 0.0));
        b.scale(Vec3::splat(2.0));
        Ok(())
    })?;
    // ceiling
    square(&mut builder, "white", |b| {
        b.translate(Vec3::new(0.0, 1.0, 0.0));
        b.scale(Vec3::splat(2.0));
        b.rotate(180.0, Vec3::X)?;
        Ok(())
    })?;
    square(&mut builder, "red", |b| {
        b.translate(Vec3::new(-1.0, 0.0, 0.0));
        b.scale(Vec3::splat(2.0));
        b.rotate(-90.0, Vec3::Z)?;
        Ok(())
    })?;
    square(&mut builder, "green", |b| {
        b.translate(Vec3::new(1.0, 0.0, 0.0));
        b.scale(Vec3::splat(2.0));
        b.rotate(90.0, Vec3::Z)?;
        Ok(())
    })?;

    builder.push_attributes();
    builder.set_material(crate::DEFAULT_MATERIAL)?;
    builder.sphere(Vec3::new(-0.4, -0.66, -0.15), 0.33)?;
    builder.set_material("glass")?;
    builder.sphere(Vec3::new(0.4, -0.66, 0.25), 0.33)?;
    builder.pop_attributes()?;

    square(&mut builder, "light", |b| {
        b.translate(Vec3::new(0.0, 0.95, 0.0));
        b.scale(Vec3::splat(light_side));
        b.rotate(180.0, Vec3::X)?;
        Ok(())
    })?;

    let camera = Camera::look_at(
        Vec3::new(0.0, 0.0, 3.0),
        Vec3::new(0.0, 0.0, -1.0),
        Vec3::Y,
        60.0,
        width as f32 / height as f32,
    );

    Ok(LoadedScene {
        scene: builder.build(),
        camera,
        width,
        height,
        render: None,
    })
}
