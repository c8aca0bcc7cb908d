use crate::CandleSeries;

/// Rendering collaborator that receives each new series snapshot.
///
/// Calls are made from the poll task right after a snapshot is published and
/// must not block for long: rendering is part of the same step as
/// reconciliation.
pub trait SeriesSink: Send + Sync {
    /// Display the full, time-ordered series.
    fn render(&self, series: &CandleSeries);

    /// Drop whatever is displayed; called when the feed switches instrument.
    fn clear(&self) {}
}
