mod columnar;
pub mod menu_functions;

pub use columnar::ColumnarLayout;
