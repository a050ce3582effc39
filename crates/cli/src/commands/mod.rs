pub(crate) mod batch;
pub(crate) mod chart;
pub(crate) mod notify;
pub(crate) mod serve;
