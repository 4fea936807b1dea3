use crate::error::Result;
use crate::transport::Transport;
use crate::types::{Measurement, ScanOptions, ScanPoint};
use crate::RplidarDevice;
use log::debug;
use std::mem;

/// Groups a stream of measurements into completed 360 degree scans.
///
/// Measurements are accumulated until one arrives with its new-scan flag set,
/// which closes the current rotation. Rotations with too few points are
/// dropped as partial (the first rotation after a start is almost always one).
#[derive(Debug, Default)]
pub struct ScanAssembler {
    current: Vec<ScanPoint>,
    min_scan_len: usize,
}

impl ScanAssembler {
    pub fn new(min_scan_len: usize) -> ScanAssembler {
        ScanAssembler {
            current: Vec::new(),
            min_scan_len,
        }
    }

    /// Feed one measurement, returning the finished scan when `measurement`
    /// closes a rotation of more than `min_scan_len` points.
    ///
    /// Zero-distance measurements still close rotations but are never added
    /// to the output.
    pub fn push(&mut self, measurement: Measurement) -> Option<Vec<ScanPoint>> {
        let mut completed = None;
        if measurement.new_scan {
            if self.current.len() > self.min_scan_len {
                completed = Some(mem::take(&mut self.current));
            } else {
                if !self.current.is_empty() {
                    debug!("Dropping a partial scan of {} points", self.current.len());
                }
                self.current.clear();
            }
        }
        if measurement.is_valid() {
            self.current.push(ScanPoint::from(measurement));
        }
        completed
    }
}

/// Pull iterator over single measurements, created by
/// [`RplidarDevice::measurements`].
///
/// The iterator never ends on its own: each `next` call drives the device for
/// one more sample and yields the outcome, so a decode or transport error
/// shows up as an `Err` item instead of terminating the stream.
#[derive(Debug)]
pub struct Measurements<'a, T> {
    pub(crate) device: &'a mut RplidarDevice<T>,
    pub(crate) options: ScanOptions,
}

impl<T: Transport> Iterator for Measurements<'_, T> {
    type Item = Result<Measurement>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.device.poll_measurement(&self.options))
    }
}

/// Pull iterator over assembled scans, created by [`RplidarDevice::scans`].
///
/// Drives the device until a full rotation has been collected and yields it
/// as one `Vec` of points, nearest-first in time order.
#[derive(Debug)]
pub struct Scans<'a, T> {
    pub(crate) device: &'a mut RplidarDevice<T>,
    pub(crate) options: ScanOptions,
    pub(crate) assembler: ScanAssembler,
}

impl<T: Transport> Iterator for Scans<'_, T> {
    type Item = Result<Vec<ScanPoint>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.device.poll_measurement(&self.options) {
                Ok(measurement) => {
                    if let Some(scan) = self.assembler.push(measurement) {
                        return Some(Ok(scan));
                    }
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(new_scan: bool, angle: f32, distance: f32) -> Measurement {
        Measurement {
            new_scan,
            quality: Some(15),
            angle,
            distance,
        }
    }

    #[test]
    fn emits_a_scan_once_the_next_rotation_starts() {
        let mut assembler = ScanAssembler::new(2);
        assert_eq!(assembler.push(sample(true, 0.0, 1000.0)), None);
        assert_eq!(assembler.push(sample(false, 90.0, 1100.0)), None);
        assert_eq!(assembler.push(sample(false, 180.0, 1200.0)), None);

        let scan = assembler.push(sample(true, 1.0, 1300.0)).unwrap();
        assert_eq!(scan.len(), 3);
        assert_eq!(scan[0].angle, 0.0);
        assert_eq!(scan[2].distance, 1200.0);
    }

    #[test]
    fn drops_rotations_at_or_below_the_minimum_length() {
        let mut assembler = ScanAssembler::new(2);
        assembler.push(sample(true, 0.0, 1000.0));
        assembler.push(sample(false, 180.0, 1000.0));
        // two points collected, not more than the minimum of two
        assert_eq!(assembler.push(sample(true, 0.5, 1000.0)), None);
    }

    #[test]
    fn zero_distance_points_close_but_never_join_a_scan() {
        let mut assembler = ScanAssembler::new(0);
        assembler.push(sample(true, 0.0, 1000.0));
        assembler.push(sample(false, 120.0, 0.0));
        assembler.push(sample(false, 240.0, 2000.0));

        let scan = assembler.push(sample(true, 0.25, 0.0)).unwrap();
        assert_eq!(scan.len(), 2);
        assert!(scan.iter().all(|point| point.distance > 0.0));

        // the closing zero-distance sample did not seed the next rotation
        assembler.push(sample(false, 300.0, 2500.0));
        let next = assembler.push(sample(true, 0.0, 500.0)).unwrap();
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].angle, 300.0);
    }

    #[test]
    fn never_emits_an_empty_scan() {
        let mut assembler = ScanAssembler::new(0);
        assert_eq!(assembler.push(sample(true, 0.0, 0.0)), None);
        assert_eq!(assembler.push(sample(true, 0.0, 0.0)), None);
    }
}
