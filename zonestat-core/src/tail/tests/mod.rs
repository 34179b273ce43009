mod process_tests;
mod supervisor_tests;
