use ilsplice_core::eval::{Frame, StackValue, evaluate};
use ilsplice_core::result::{Error, Result};
use ilsplice_core::{MethodSignature, process_listing};

#[test]
fn unresolved_calls_surface_the_signature() {
    let body = process_listing("call Host::missing/0").unwrap();
    let mut resolver = |target: &MethodSignature, _: &mut Frame| -> Result<()> {
        Err(Error::UnresolvedCall(target.to_string()))
    };
    let err = evaluate(body.as_slice(), &mut Frame::default(), &mut resolver).unwrap_err();
    assert_eq!(err.to_string(), "unresolved call to Host::missing/0");
}

#[test]
fn address_cannot_be_used_as_number() {
    let body = process_listing("ldloca.s V_0\nldc.r8 2.0\nmul").unwrap();
    let mut resolver = |_: &MethodSignature, _: &mut Frame| -> Result<()> { Ok(()) };
    let mut frame = Frame::with_locals(vec![1.0]);
    let err = evaluate(body.as_slice(), &mut frame, &mut resolver).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { index: 2, .. }));
}

#[test]
fn ret_stops_evaluation() {
    let body = process_listing("ldc.i4 1\nret\nmul").unwrap();
    let mut resolver = |_: &MethodSignature, _: &mut Frame| -> Result<()> { Ok(()) };
    let mut frame = Frame::default();
    evaluate(body.as_slice(), &mut frame, &mut resolver).unwrap();
    assert_eq!(frame.stack, vec![StackValue::Number(1.0)]);
}
