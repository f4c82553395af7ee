use std::collections::{BTreeMap, HashMap};

/// Per-pixel integer deltas written by one control for one operation
///
/// Values are unbounded; the composer clips after each stage. For operations
/// in the HSL stage the three lanes are hue, saturation and lightness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaArray {
    deltas: Vec<[i32; 3]>,
}

impl DeltaArray {
    pub fn zeros(len: usize) -> Self {
        Self {
            deltas: vec![[0; 3]; len],
        }
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// True when the array contributes nothing
    pub fn is_zero(&self) -> bool {
        self.deltas.iter().all(|d| *d == [0; 3])
    }

    pub fn clear(&mut self) {
        self.deltas.fill([0; 3]);
    }

    /// Write `value` into one channel of every pixel
    pub fn fill_channel(&mut self, channel: usize, value: i32) {
        for delta in &mut self.deltas {
            delta[channel] = value;
        }
    }

    /// Write a linear ramp from 0 towards `value + 1` into one channel
    ///
    /// Pixel `i` gets `trunc(i * (value + 1) / (len - 1))`, so the last pixel
    /// lands on `value + 1`. A single pixel gets 0.
    pub fn ramp_channel(&mut self, channel: usize, value: i32) {
        let len = self.deltas.len();
        let end = f64::from(value) + 1.0;
        for (i, delta) in self.deltas.iter_mut().enumerate() {
            delta[channel] = if len > 1 {
                (i as f64 * end / (len - 1) as f64) as i32
            } else {
                0
            };
        }
    }

    /// Write all three channels of one pixel
    pub fn set_pixel(&mut self, index: usize, value: [i32; 3]) {
        if let Some(delta) = self.deltas.get_mut(index) {
            *delta = value;
        }
    }

    pub fn get(&self, index: usize) -> Option<[i32; 3]> {
        self.deltas.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[i32; 3]> {
        self.deltas.iter()
    }
}

/// Persistent accumulator of (operation, control) → delta array
///
/// Entries exist for every operation key and every known control from
/// construction onwards. Switching an operation off zeroes its entry; nothing
/// is ever removed.
#[derive(Debug, Clone)]
pub struct SumTable {
    pixel_count: usize,
    entries: HashMap<&'static str, BTreeMap<String, DeltaArray>>,
}

impl SumTable {
    pub fn new<C>(pixel_count: usize, ops: &[&'static str], controls: C) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let controls: Vec<String> = controls.into_iter().map(Into::into).collect();
        let entries = ops
            .iter()
            .map(|op| {
                let per_control = controls
                    .iter()
                    .map(|control| (control.clone(), DeltaArray::zeros(pixel_count)))
                    .collect();
                (*op, per_control)
            })
            .collect();

        Self {
            pixel_count,
            entries,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    pub fn has_control(&self, control: &str) -> bool {
        self.entries
            .values()
            .next()
            .map_or(false, |per_control| per_control.contains_key(control))
    }

    pub fn get(&self, op: &str, control: &str) -> Option<&DeltaArray> {
        self.entries.get(op)?.get(control)
    }

    pub fn get_mut(&mut self, op: &str, control: &str) -> Option<&mut DeltaArray> {
        self.entries.get_mut(op)?.get_mut(control)
    }

    /// Every control's array for one operation
    pub fn contributions<'a>(&'a self, op: &str) -> impl Iterator<Item = &'a DeltaArray> + 'a {
        self.entries
            .get(op)
            .into_iter()
            .flat_map(|per_control| per_control.values())
    }

    /// Zero every entry
    pub fn reset(&mut self) {
        for per_control in self.entries.values_mut() {
            for deltas in per_control.values_mut() {
                deltas.clear();
            }
        }
    }

    /// True when no entry contributes anything
    pub fn is_zero(&self) -> bool {
        self.entries
            .values()
            .flat_map(|per_control| per_control.values())
            .all(DeltaArray::is_zero)
    }
}
