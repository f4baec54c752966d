pub mod demo_crud;
