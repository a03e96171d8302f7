// proton gyromagnetic ratio (Hz/T)
pub const GAMMA_BAR:f64 = 42.58e6;

// k-space area (1/m) -> gradient moment (T*s/m)
pub fn k_area_to_moment(k_area:f64) -> f64 {
    k_area/GAMMA_BAR
}
