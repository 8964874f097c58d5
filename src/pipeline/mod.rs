pub mod lab_extraction;
