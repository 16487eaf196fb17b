//! Persistence for simulation results.
//!
//! A batch of playouts is stored as a postcard-encoded [`SimulationReport`]
//! holding every game record and the aggregate statistics. Scores and lengths
//! can also be appended to a text file as R vectors, and the pooled delta
//! counts saved on their own for random-walk modelling.

mod report;
mod rexport;

pub use report::{
    ReportMeta,
    SimulationReport,
    SerializationError,
    to_postcard_bytes,
    from_postcard_bytes,
    write_report_to_path,
    read_report_from_path,
    write_delta_counts,
    read_delta_counts,
};
pub use rexport::{append_r_vector, r_vector};
