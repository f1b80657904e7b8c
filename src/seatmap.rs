use rand::Rng;

/// Occupancy source. Stands in for a real per-venue data service: whatever
/// the venue id, it hands back a random n x n matrix of 0 (free) and
/// 1 (occupied), rows in index order. Shape is this provider's contract;
/// the grid does not re-validate it.
pub fn fetch(venue: &str, n: usize, occupied_ratio: f64) -> Vec<Vec<u8>> {
    log::info!("fetching seat map for venue '{venue}' ({n}x{n})");
    let mut rng = rand::thread_rng();
    (0..n)
        .map(|_| {
            (0..n)
                .map(|_| u8::from(rng.gen_bool(occupied_ratio.clamp(0.0, 1.0))))
                .collect()
        })
        .collect()
}
