// tolerance (in raster periods) below which a time is considered to already sit on the raster
const RASTER_TOLERANCE:f64 = 1E-6;

pub fn raster_periods(t_seconds:f64,raster:f64) -> u64 {
    let periods = t_seconds/raster;
    let nearest = periods.round();
    if (periods - nearest).abs() < RASTER_TOLERANCE {
        return nearest.max(0.0) as u64
    }
    periods.ceil().max(0.0) as u64
}

pub fn ceil_to_raster(t_seconds:f64,raster:f64) -> f64 {
    raster_periods(t_seconds,raster) as f64 * raster
}

pub fn sec_to_us(seconds:f64) -> f64 {
    seconds*1.0E6
}
