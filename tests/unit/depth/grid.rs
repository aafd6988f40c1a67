use super::*;

#[test]
fn from_rows_keeps_row_major_order() {
    let g = DepthGrid::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
    assert_eq!((g.width(), g.height()), (3, 2));
    assert_eq!(g.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert_eq!(g.row(1).unwrap(), &[4.0, 5.0, 6.0]);
    assert_eq!(g.get(2, 0), Some(3.0));
    assert_eq!(g.get(3, 0), None);
    assert_eq!(g.row(2), None);
    assert_eq!(g.rows().len(), 2);
    assert_eq!(g.into_rows(), vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
}

#[test]
fn ragged_rows_are_decode_errors() {
    let err = DepthGrid::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
    assert!(matches!(err, RgbdError::Decode(_)));
    assert!(err.to_string().contains("row 1"));
}

#[test]
fn new_checks_value_count() {
    assert!(DepthGrid::new(2, 2, vec![0.0; 4]).is_ok());
    assert!(matches!(
        DepthGrid::new(2, 2, vec![0.0; 3]),
        Err(RgbdError::Decode(_))
    ));
}

#[test]
fn empty_row_list_is_an_empty_grid() {
    let rows: [Vec<f32>; 0] = [];
    let g = DepthGrid::from_rows(&rows).unwrap();
    assert_eq!((g.width(), g.height()), (0, 0));
    assert!(g.into_rows().is_empty());
}
