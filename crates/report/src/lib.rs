pub mod compiler;

pub use compiler::{AppendixFigure, ComponentSection, ReportDocument};
