pub mod test_presenter_left_rearms;
