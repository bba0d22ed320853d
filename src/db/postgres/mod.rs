pub(super) mod time_series;
