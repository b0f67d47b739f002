//! Median-cut partitioning of RGB space.
//!
//! Boxes hold distinct colors. The split loop always attacks the most
//! populous splittable box, cuts it along the channel with the largest
//! perceptually weighted range, and partitions at the median value found by
//! quickselect.

/// Perceptual channel weights as integer numerators over a common scale:
/// red 1.0, green 0.8, blue 0.5.
const CHANNEL_WEIGHTS: [u32; 3] = [10, 8, 5];

/// A box of distinct colors awaiting subdivision.
#[derive(Debug)]
struct ColorBox {
    colors: Vec<[u8; 3]>,
    /// Cleared once a split came out degenerate.
    splittable: bool,
}

impl ColorBox {
    fn new(colors: Vec<[u8; 3]>) -> Self {
        let splittable = colors.len() > 1;
        Self { colors, splittable }
    }

    /// Channel with the largest weighted range. Ties fall to the earlier
    /// channel, keeping red preferred over green over blue.
    fn widest_channel(&self) -> usize {
        let mut min = [255u8; 3];
        let mut max = [0u8; 3];
        for color in &self.colors {
            for c in 0..3 {
                min[c] = min[c].min(color[c]);
                max[c] = max[c].max(color[c]);
            }
        }

        let mut best = 0;
        let mut best_score = 0u32;
        for c in 0..3 {
            let score = (max[c] - min[c]) as u32 * CHANNEL_WEIGHTS[c];
            if score > best_score {
                best_score = score;
                best = c;
            }
        }
        best
    }

    /// Split at the median of the widest channel. Returns `None` when every
    /// color lands on one side (all values equal along that channel).
    fn split(&mut self) -> Option<ColorBox> {
        let channel = self.widest_channel();
        let mut values: Vec<u8> = self.colors.iter().map(|c| c[channel]).collect();
        let median = quickselect(&mut values, self.colors.len() / 2);

        let (low, high): (Vec<[u8; 3]>, Vec<[u8; 3]>) =
            self.colors.iter().partition(|c| c[channel] < median);

        if low.is_empty() || high.is_empty() {
            self.splittable = false;
            return None;
        }

        self.colors = low;
        self.splittable = self.colors.len() > 1;
        Some(ColorBox::new(high))
    }

    /// Arithmetic mean color, floor division per channel.
    fn mean(&self) -> [u8; 3] {
        let mut sum = [0u64; 3];
        for color in &self.colors {
            for c in 0..3 {
                sum[c] += color[c] as u64;
            }
        }
        let n = self.colors.len() as u64;
        [
            (sum[0] / n) as u8,
            (sum[1] / n) as u8,
            (sum[2] / n) as u8,
        ]
    }
}

/// Value of rank `k` (0-based) in `values`, by iterative quickselect with a
/// middle pivot and Lomuto partitioning.
fn quickselect(values: &mut [u8], k: usize) -> u8 {
    let mut lo = 0usize;
    let mut hi = values.len() - 1;

    while lo < hi {
        values.swap(lo + (hi - lo) / 2, hi);
        let pivot = values[hi];
        let mut store = lo;
        for i in lo..hi {
            if values[i] < pivot {
                values.swap(i, store);
                store += 1;
            }
        }
        values.swap(store, hi);

        if k == store {
            break;
        } else if k < store {
            hi = store - 1;
        } else {
            lo = store + 1;
        }
    }

    values[k]
}

/// Partition `colors` (distinct) into at most `max_colors` groups and return
/// each group's floor-mean representative alongside its members.
pub(crate) fn partition(colors: Vec<[u8; 3]>, max_colors: usize) -> Vec<([u8; 3], Vec<[u8; 3]>)> {
    let mut boxes = vec![ColorBox::new(colors)];

    while boxes.len() < max_colors {
        // Most populous splittable box; earlier boxes win ties.
        let mut target: Option<usize> = None;
        for (i, b) in boxes.iter().enumerate() {
            if !b.splittable {
                continue;
            }
            if target.is_none_or(|t| b.colors.len() > boxes[t].colors.len()) {
                target = Some(i);
            }
        }
        let Some(idx) = target else {
            break;
        };

        if let Some(half) = boxes[idx].split() {
            boxes.push(half);
        }
    }

    boxes
        .into_iter()
        .map(|b| (b.mean(), b.colors))
        .collect()
}
