pub mod station_server;
