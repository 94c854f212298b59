use ratatui::style::Color;

use crate::sample::Sample;

/// Horizontal scale of the plot, in logical pixels per second.
pub const PX_PER_SECOND: f64 = 150.0;

/// Default logical plot surface, padding excluded.
pub const PLOT_WIDTH: f64 = 900.0;
pub const PLOT_HEIGHT: f64 = 300.0;

const PADDING_X: f64 = 50.0;
const PADDING_Y: f64 = 60.0;

/// Y-axis ceiling the chart starts with, in KB/s. Raised as soon as a faster
/// sample arrives.
const INITIAL_CEILING_KBS: f64 = 1000.0;

const LABEL_OFFSET_X: f64 = 15.0;
const LABEL_OFFSET_Y: f64 = -15.0;

/// Raw logical coordinate of one measurement: seconds on X, KB/s on Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub time: f64,
    pub value: f64,
}

/// Projected, padded screen position. Always derived from a [`SeriesPoint`]
/// through [`project`]; recomputed whenever the ceiling or origin changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenVertex {
    pub x: f64,
    pub y: f64,
    pub color: Color,
}

#[derive(Debug, Clone, Copy)]
struct SeriesEntry {
    point: SeriesPoint,
    vertex: ScreenVertex,
}

/// One plotted curve. Each raw point is stored next to its projection, so the
/// two can never drift out of step. Entries are in strictly increasing time
/// order.
pub struct Series {
    entries: Vec<SeriesEntry>,
    color: Color,
}

impl Series {
    fn new(color: Color) -> Self {
        Self {
            entries: Vec::new(),
            color,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn vertices(&self) -> impl Iterator<Item = &ScreenVertex> {
        self.entries.iter().map(|e| &e.vertex)
    }

    pub fn last_vertex(&self) -> Option<&ScreenVertex> {
        self.entries.last().map(|e| &e.vertex)
    }

    fn push(&mut self, point: SeriesPoint, axis: &AxisState) {
        let vertex = project(point, axis, self.color);
        self.entries.push(SeriesEntry { point, vertex });
    }

    /// Drop the oldest entry and report the raw time of the survivor that now
    /// leads the series, if any.
    fn drop_oldest(&mut self) -> Option<f64> {
        if !self.entries.is_empty() {
            self.entries.remove(0);
        }
        self.entries.first().map(|e| e.point.time)
    }
}

/// Axis scaling state. `rate_ceiling` never decreases between two scroll
/// rebuilds; `origin_time` only moves on a scroll rebuild.
#[derive(Debug, Clone, Copy)]
pub struct AxisState {
    pub origin_time: f64,
    pub rate_ceiling: f64,
    pub plot_width: f64,
    pub plot_height: f64,
    pub padding: (f64, f64),
}

impl AxisState {
    pub fn new(plot_width: f64, plot_height: f64) -> Self {
        Self {
            origin_time: 0.0,
            rate_ceiling: INITIAL_CEILING_KBS,
            plot_width,
            plot_height,
            padding: (PADDING_X, PADDING_Y),
        }
    }
}

impl Default for AxisState {
    fn default() -> Self {
        Self::new(PLOT_WIDTH, PLOT_HEIGHT)
    }
}

/// Unclamped X projection, padding excluded. Used for the overflow check.
fn raw_x(time: f64, axis: &AxisState) -> f64 {
    (time - axis.origin_time) * PX_PER_SECOND
}

/// Project a raw point into a padded screen vertex. Pure function of its
/// arguments: the same point against the same axis always yields the same
/// vertex. X is clamped to the right edge; Y is inverted (zero at the
/// bottom), linear against the ceiling.
pub fn project(point: SeriesPoint, axis: &AxisState, color: Color) -> ScreenVertex {
    let x = raw_x(point.time, axis).min(axis.plot_width);
    let y = axis.plot_height - (point.value * axis.plot_height / axis.rate_ceiling);
    ScreenVertex {
        x: x + axis.padding.0,
        y: y + axis.padding.1,
        color,
    }
}

/// Re-project every vertex of a series against the current axis.
fn relayout(series: &mut Series, axis: &AxisState) {
    let color = series.color;
    for entry in &mut series.entries {
        entry.vertex = project(entry.point, axis, color);
    }
}

/// Text labels refreshed once per consumed sample.
#[derive(Debug, Clone, Default)]
pub struct LabelState {
    pub avg_text: String,
    pub avg_pos: (f64, f64),
    pub window_text: String,
    pub window_pos: (f64, f64),
    pub time_text: String,
    pub size_text: String,
    pub ceiling_text: String,
}

/// The chart itself: two series sharing one axis, consumer-thread only,
/// mutated at most once per frame.
pub struct ChartModel {
    pub axis: AxisState,
    average: Series,
    window: Series,
    pub labels: LabelState,
}

impl ChartModel {
    pub fn new(axis: AxisState) -> Self {
        Self {
            axis,
            average: Series::new(Color::Red),
            window: Series::new(Color::Yellow),
            labels: LabelState::default(),
        }
    }

    pub fn average(&self) -> &Series {
        &self.average
    }

    pub fn window(&self) -> &Series {
        &self.window
    }

    /// Consume one sample: raise the ceiling if exceeded, scroll if the new
    /// point lands past the right edge, then append and refresh the labels.
    pub fn update(&mut self, sample: Sample) {
        // Axis autoscale: the ceiling only ever rises within an epoch, and a
        // rise re-projects everything already plotted.
        if sample.avg_kbs >= self.axis.rate_ceiling || sample.window_kbs >= self.axis.rate_ceiling {
            self.axis.rate_ceiling = self
                .axis
                .rate_ceiling
                .max(sample.avg_kbs)
                .max(sample.window_kbs);
            relayout(&mut self.average, &self.axis);
            relayout(&mut self.window, &self.axis);
        }

        // Horizontal scroll: drop the oldest point of each series and anchor
        // the origin to the raw time of the new oldest survivor. Both series
        // carry the same timestamps, so either origin works.
        if raw_x(sample.time, &self.axis) >= self.axis.plot_width {
            let origin_avg = self.average.drop_oldest();
            let origin_win = self.window.drop_oldest();
            self.axis.origin_time = origin_avg.or(origin_win).unwrap_or(sample.time);
            relayout(&mut self.average, &self.axis);
            relayout(&mut self.window, &self.axis);
        }

        self.average.push(
            SeriesPoint {
                time: sample.time,
                value: sample.avg_kbs,
            },
            &self.axis,
        );
        self.window.push(
            SeriesPoint {
                time: sample.time,
                value: sample.window_kbs,
            },
            &self.axis,
        );

        self.refresh_labels(&sample);
    }

    fn refresh_labels(&mut self, sample: &Sample) {
        let labels = &mut self.labels;
        if let Some(v) = self.average.last_vertex() {
            labels.avg_text = format!("{:.0} KB/s", sample.avg_kbs);
            labels.avg_pos = (v.x + LABEL_OFFSET_X, v.y + LABEL_OFFSET_Y);
        }
        if let Some(v) = self.window.last_vertex() {
            labels.window_text = format!("{:.0} KB/s", sample.window_kbs);
            labels.window_pos = (v.x + LABEL_OFFSET_X, v.y + LABEL_OFFSET_Y);
        }
        labels.time_text = format!("Time : {:.2} seconds", sample.time);
        labels.size_text = format!("Size downloaded : {:.0} MB", sample.cumulative_kb / 1024.0);
        labels.ceiling_text = format!("{:.0} KB/s", self.axis.rate_ceiling);
    }
}
