use std::sync::atomic::{AtomicU32, AtomicU64};

/// Tile edge length in pixels. 64×64 keeps a tile's working set small while
/// still amortizing the per-tile claim overhead.
pub const TILE_SIZE: u32 = 64;

/// A rectangular tile within the image. Identical on master and worker: the
/// HTTP wire format of §4.6 carries exactly these four fields.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    pub tw: u32,
    pub th: u32,
}

impl Tile {
    pub fn pixel_count(&self) -> usize {
        self.tw as usize * self.th as usize
    }
}

/// Build a grid of tiles covering `width × height` exactly once, per §4.2's
/// tile-coverage invariant.
pub fn build_tile_grid(width: u32, height: u32) -> Vec<Tile> {
    let mut tiles = Vec::new();
    let mut y = 0;
    while y < height {
        let th = TILE_SIZE.min(height - y);
        let mut x = 0;
        while x < width {
            let tw = TILE_SIZE.min(width - x);
            tiles.push(Tile { x, y, tw, th });
            x += tw;
        }
        y += th;
    }
    tiles
}

/// The shared work queue for a render: the tile list plus the atomic claim
/// cursor described in §4.4/§5. The same structure backs both the
/// standalone thread pool and the master's `GET /api/work` handler — both
/// claim tiles with `fetch_add` on `tile_finished`.
pub struct Work {
    pub tiles: Vec<Tile>,
    pub tile_finished: AtomicU32,
    pub ray_count: AtomicU64,
}

impl Work {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            tiles: build_tile_grid(width, height),
            tile_finished: AtomicU32::new(0),
            ray_count: AtomicU64::new(0),
        }
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Atomically claim the next tile index, or `None` if all tiles are
    /// already claimed. This is the single synchronization point shared by
    /// every local render thread and every remote worker's `/api/work` poll.
    pub fn claim_next(&self) -> Option<(usize, Tile)> {
        let idx = self
            .tile_finished
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed) as usize;
        self.tiles.get(idx).map(|&tile| (idx, tile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_grid_covers_image_exactly_once() {
        let tiles = build_tile_grid(200, 150);
        let mut covered = vec![false; 200 * 150];
        for tile in &tiles {
            for py in tile.y..tile.y + tile.th {
                for px in tile.x..tile.x + tile.tw {
                    let idx = py as usize * 200 + px as usize;
                    assert!(!covered[idx], "pixel ({px}, {py}) covered twice");
                    covered[idx] = true;
                }
            }
        }
        assert!(covered.iter().all(|&c| c));
    }

    #[test]
    fn tile_size_respects_constant() {
        for tile in build_tile_grid(256, 256) {
            assert!(tile.tw <= TILE_SIZE);
            assert!(tile.th <= TILE_SIZE);
        }
    }

    #[test]
    fn claim_next_stops_at_tile_count() {
        let work = Work::new(64, 64);
        let count = work.tile_count();
        for _ in 0..count {
            assert!(work.claim_next().is_some());
        }
        assert!(work.claim_next().is_none());
        assert_eq!(
            work.tile_finished
                .load(std::sync::atomic::Ordering::Relaxed) as usize,
            count + 1
        );
    }

    #[test]
    fn claim_next_is_unique_under_contention() {
        use std::sync::Arc;
        let work = Arc::new(Work::new(512, 512));
        let tile_count = work.tile_count();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let work = Arc::clone(&work);
            handles.push(std::thread::spawn(move || {
                let mut claimed = Vec::new();
                while let Some((idx, _)) = work.claim_next() {
                    claimed.push(idx);
                }
                claimed
            }));
        }
        let mut all_claimed: Vec<usize> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all_claimed.sort_unstable();
        let expected: Vec<usize> = (0..tile_count).collect();
        assert_eq!(all_claimed, expected);
    }
}
