pub mod library_service;
