pub mod remote_solver;
