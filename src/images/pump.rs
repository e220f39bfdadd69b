//! Row-at-a-time streaming of decoded samples into a device.
//!
//! The device's [`next_planes`](crate::graphics::Device::next_planes) may
//! accept less than it is offered. Whatever it leaves behind is carried
//! into the next call instead of being re-read, so the source is consumed
//! exactly once.

use crate::error::{Error, Result};
use crate::graphics::Device;
use std::io::Read;

/// Bytes in one packed row of `width` samples.
pub fn row_length(width: u32, components: usize, bits_per_component: u8) -> Result<usize> {
    (width as usize)
        .checked_mul(components)
        .and_then(|n| n.checked_mul(bits_per_component as usize))
        .and_then(|bits| bits.checked_add(7))
        .map(|bits| bits / 8)
        .ok_or_else(|| {
            Error::LimitCheck(format!(
                "row of {} x {} x {} bits overflows",
                width, components, bits_per_component
            ))
        })
}

/// Where the pump is between steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpState {
    /// The row buffer is drained; the next step reads a fresh row
    NeedRow,
    /// Part of the current row is still waiting for the device
    Carry,
    /// Every row has been delivered
    Done,
}

/// Streams `rows` rows of `line_len` bytes from `source` into a device.
///
/// With a mask buffer the device sees two planes, the mask as plane 0 and
/// the samples as plane 1. Progress is measured on the samples plane only.
pub struct RowPump<R: Read> {
    source: R,
    row: Vec<u8>,
    row_used: usize,
    bytes_left: usize,
    mask: Option<Vec<u8>>,
    mask_used: usize,
    rows_read: u32,
}

impl<R: Read> RowPump<R> {
    /// Create a pump with its row buffer allocated up front.
    pub fn new(source: R, line_len: usize, rows: u32, mask: Option<Vec<u8>>) -> Result<Self> {
        let bytes_left = line_len
            .checked_mul(rows as usize)
            .ok_or_else(|| Error::LimitCheck(format!("{} rows of {} bytes", rows, line_len)))?;
        let mut row = Vec::new();
        row.try_reserve_exact(line_len)
            .map_err(|e| Error::Allocation(format!("row buffer of {} bytes: {}", line_len, e)))?;
        row.resize(line_len, 0);
        Ok(Self {
            source,
            row_used: line_len,
            row,
            bytes_left,
            mask,
            mask_used: 0,
            rows_read: 0,
        })
    }

    /// Current state.
    pub fn state(&self) -> PumpState {
        if self.bytes_left == 0 {
            PumpState::Done
        } else if self.row_used == self.row.len() {
            PumpState::NeedRow
        } else {
            PumpState::Carry
        }
    }

    /// Sample bytes not yet accepted by the device.
    pub fn bytes_left(&self) -> usize {
        self.bytes_left
    }

    /// Rows read from the source so far.
    pub fn rows_read(&self) -> u32 {
        self.rows_read
    }

    /// Mask bytes accepted so far.
    pub fn mask_consumed(&self) -> usize {
        self.mask_used
    }

    /// Offer the device one batch of planes.
    pub fn step(&mut self, device: &mut dyn Device) -> Result<PumpState> {
        match self.state() {
            PumpState::Done => return Ok(PumpState::Done),
            PumpState::NeedRow => self.fill_row()?,
            PumpState::Carry => {},
        }

        let pending = &self.row[self.row_used..];
        let (accepted, mask_accepted) = match &self.mask {
            Some(mask) => {
                let mask_pending = &mask[self.mask_used.min(mask.len())..];
                let mut used = [0usize; 2];
                device.next_planes(&[mask_pending, pending], &mut used)?;
                (used[1].min(pending.len()), used[0].min(mask_pending.len()))
            },
            None => {
                let mut used = [0usize; 1];
                device.next_planes(&[pending], &mut used)?;
                (used[0].min(pending.len()), 0)
            },
        };

        if accepted == 0 && mask_accepted == 0 {
            return Err(Error::LimitCheck(format!(
                "device accepted nothing with {} bytes left",
                self.bytes_left
            )));
        }

        self.row_used += accepted;
        self.mask_used += mask_accepted;
        self.bytes_left -= accepted;
        log::trace!(
            "Device took {} sample and {} mask bytes, {} left",
            accepted,
            mask_accepted,
            self.bytes_left
        );
        Ok(self.state())
    }

    /// Step until every row has been delivered.
    pub fn run(&mut self, device: &mut dyn Device) -> Result<()> {
        while self.step(device)? != PumpState::Done {}
        Ok(())
    }

    fn fill_row(&mut self) -> Result<()> {
        let mut filled = 0;
        while filled < self.row.len() {
            match self.source.read(&mut self.row[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        if filled != self.row.len() {
            return Err(Error::ImageData(format!(
                "row {} has {} of {} bytes",
                self.rows_read,
                filled,
                self.row.len()
            )));
        }
        self.row_used = 0;
        self.rows_read += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::{GroupParams, ImageParams, NullDevice, SoftMaskParams};
    use std::io::Cursor;

    /// Accepts at most `limit` bytes of each plane per call.
    struct Trickle {
        limit: usize,
        taken: Vec<Vec<u8>>,
    }

    impl Device for Trickle {
        fn begin_image(&mut self, _params: &ImageParams) -> Result<()> {
            Ok(())
        }

        fn next_planes(&mut self, planes: &[&[u8]], used: &mut [usize]) -> Result<()> {
            self.taken.resize(planes.len(), Vec::new());
            for (i, plane) in planes.iter().enumerate() {
                let n = plane.len().min(self.limit);
                self.taken[i].extend_from_slice(&plane[..n]);
                used[i] = n;
            }
            Ok(())
        }

        fn end_image(&mut self) -> Result<()> {
            Ok(())
        }

        fn begin_transparency_group(&mut self, _group: &GroupParams) -> Result<()> {
            Ok(())
        }

        fn end_transparency_group(&mut self) -> Result<()> {
            Ok(())
        }

        fn begin_transparency_mask(&mut self, _mask: &SoftMaskParams) -> Result<()> {
            Ok(())
        }

        fn end_transparency_mask(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_row_length_rounds_up() {
        assert_eq!(row_length(10, 3, 8).unwrap(), 30);
        assert_eq!(row_length(9, 1, 1).unwrap(), 2);
        assert_eq!(row_length(3, 1, 4).unwrap(), 2);
        assert!(matches!(row_length(u32::MAX, usize::MAX, 16), Err(Error::LimitCheck(_))));
    }

    #[test]
    fn test_full_consumer_reads_each_row_once() {
        let data: Vec<u8> = (0..60).collect();
        let mut pump = RowPump::new(Cursor::new(data), 6, 10, None).unwrap();
        let mut device = NullDevice::default();
        pump.run(&mut device).unwrap();
        assert_eq!(device.bytes_accepted, 60);
        assert_eq!(pump.rows_read(), 10);
    }

    #[test]
    fn test_partial_consumer_carries_remainder() {
        let data: Vec<u8> = (0..24).collect();
        let mut pump = RowPump::new(Cursor::new(data.clone()), 8, 3, None).unwrap();
        let mut device = Trickle {
            limit: 3,
            taken: Vec::new(),
        };

        assert_eq!(pump.step(&mut device).unwrap(), PumpState::Carry);
        pump.run(&mut device).unwrap();
        assert_eq!(device.taken[0], data);
        assert_eq!(pump.rows_read(), 3);
    }

    #[test]
    fn test_mask_plane_advances_independently() {
        let data = vec![7u8; 8];
        let mask = vec![1u8, 2, 3, 4, 5];
        let mut pump = RowPump::new(Cursor::new(data), 4, 2, Some(mask.clone())).unwrap();
        let mut device = Trickle {
            limit: 2,
            taken: Vec::new(),
        };
        pump.run(&mut device).unwrap();
        assert_eq!(device.taken[0], mask);
        assert_eq!(device.taken[1], vec![7u8; 8]);
        assert_eq!(pump.mask_consumed(), 5);
    }

    #[test]
    fn test_short_source_is_image_data_error() {
        let mut pump = RowPump::new(Cursor::new(vec![0u8; 10]), 4, 3, None).unwrap();
        let mut device = NullDevice::default();
        assert!(matches!(pump.run(&mut device), Err(Error::ImageData(_))));
    }

    #[test]
    fn test_stalled_device_is_limitcheck() {
        let mut pump = RowPump::new(Cursor::new(vec![0u8; 4]), 4, 1, None).unwrap();
        let mut device = Trickle {
            limit: 0,
            taken: Vec::new(),
        };
        assert!(matches!(pump.step(&mut device), Err(Error::LimitCheck(_))));
    }

    #[test]
    fn test_zero_rows_is_done() {
        let pump = RowPump::new(Cursor::new(Vec::new()), 4, 0, None).unwrap();
        assert_eq!(pump.state(), PumpState::Done);
    }
}
