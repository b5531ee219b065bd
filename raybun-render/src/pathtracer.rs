use raybun_core::{ray_colour, Camera, Colour, Rng, Scene};

use crate::state::finalize_pixel;
use crate::tile::Tile;

/// Render every pixel of `tile` into `out`, row-major, `tile.tw * tile.th`
/// entries of packed ARGB. `rng` is the thread/worker-local xorshift32
/// generator for this tile (§4.4/§5: seeded per tile, not shared).
pub fn render_tile(
    scene: &Scene,
    camera: &Camera,
    tile: &Tile,
    width: u32,
    height: u32,
    samples_per_pixel: u32,
    max_depth: u32,
    rng: &mut Rng,
) -> Vec<u32> {
    let mut out = Vec::with_capacity(tile.pixel_count());
    for row in 0..tile.th {
        for col in 0..tile.tw {
            let px = tile.x + col;
            let py = tile.y + row;
            let colour = sample_pixel(
                scene,
                camera,
                px,
                py,
                width,
                height,
                samples_per_pixel,
                max_depth,
                rng,
            );
            out.push(finalize_pixel(colour, samples_per_pixel));
        }
    }
    out
}

/// Accumulate `samples_per_pixel` stochastic samples at image pixel
/// `(px, py)`. Does not itself average or gamma-encode — see
/// `state::finalize_pixel` for that final step.
#[allow(clippy::too_many_arguments)]
fn sample_pixel(
    scene: &Scene,
    camera: &Camera,
    px: u32,
    py: u32,
    width: u32,
    height: u32,
    samples_per_pixel: u32,
    max_depth: u32,
    rng: &mut Rng,
) -> Colour {
    let mut accum = Colour::ZERO;
    for _ in 0..samples_per_pixel {
        let u = (px as f32 + rng.next_f32()) / width as f32;
        // Image row 0 is the top; the camera's viewport basis has t=0 at
        // the bottom, so flip.
        let v = 1.0 - (py as f32 + rng.next_f32()) / height as f32;
        let ray = camera.get_ray(u, v, rng);
        accum += ray_colour(&ray, scene, max_depth, rng);
    }
    accum
}
