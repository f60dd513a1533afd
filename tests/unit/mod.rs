pub mod cause_chain_tests;
pub mod href_tests;
pub mod node_writer_tests;
