mod common;

use common::*;
use pretty_assertions::assert_eq;
use ptouch::{Canvas, Compositor, Error, PrintJob, PrintJobOptions, RenderConfig, State};

fn label(tape_width: u32) -> Canvas {
    let mut image = Canvas::new(100, 60);
    for x in 10..90 {
        image.set_ink(x, 30);
    }
    let config = RenderConfig::new();
    let mut c = Compositor::new(tape_width, &config);
    c.append(&image).cutmark();
    c.finish().unwrap()
}

#[test]
fn image_and_cutmark_on_24mm_tape() {
    let mut printer = printer(PT_P700, RecordingTransport::with_status(24));
    let canvas = label(128);
    assert_eq!(canvas.width(), 109);

    PrintJob::new(&mut printer, PrintJobOptions::new())
        .run(&canvas)
        .unwrap();

    let t = printer.transport();
    let after = t.after_status();
    assert_eq!(after[0], vec![0x4D, 0x02]);
    assert_eq!(after[1], vec![0x1B, 0x69, 0x61, 0x01]);
    assert_eq!(after[2], vec![0x1B, 0x69, 0x4D, 0x40]);

    let lines = t.raster_lines();
    assert_eq!(lines.len(), 109);
    for line in &lines {
        let len = u16::from_le_bytes([line[1], line[2]]) as usize;
        assert_eq!(line.len(), 3 + len);
    }
    assert_eq!(t.writes.last(), Some(&vec![0x1A]));
    assert_eq!(t.finalize_bytes(), vec![0x1A]);
}

#[test]
fn too_wide_canvas_is_rejected_before_raster_data() {
    let mut printer = printer(PT_P700, RecordingTransport::with_status(12));
    let canvas = Canvas::new(40, 77);

    match PrintJob::new(&mut printer, PrintJobOptions::new()).run(&canvas) {
        Err(Error::CanvasTooWide {
            length: 40,
            height: 77,
            max: 76,
        }) => {}
        other => panic!("unexpected {:?}", other),
    }
    assert!(printer.transport().after_status().is_empty());
    assert!(printer.transport().raster_lines().is_empty());
}

#[test]
fn chained_copies_are_cut_once() {
    let mut printer = printer(PT_1230PC, RecordingTransport::with_status(12));
    let canvas = label(76);
    let options = PrintJobOptions::new().copies(3).chain(true);

    PrintJob::new(&mut printer, options).run(&canvas).unwrap();

    let t = printer.transport();
    assert_eq!(t.finalize_bytes(), vec![0x0C, 0x0C, 0x1A]);
    assert_eq!(t.raster_lines().len(), 3 * 109);
    // one raster mode switch per copy
    let starts = t
        .writes
        .iter()
        .filter(|w| w.as_slice() == [0x1B, 0x69, 0x52, 0x01])
        .count();
    assert_eq!(starts, 3);
}

#[test]
fn unchained_copies_are_cut_once_at_the_end() {
    let mut printer = printer(PT_D460BT, RecordingTransport::with_status(12));
    let options = PrintJobOptions::new().copies(3);

    PrintJob::new(&mut printer, options)
        .run(&Canvas::new(10, 70))
        .unwrap();

    let t = printer.transport();
    assert_eq!(t.finalize_bytes(), vec![0x0C, 0x0C, 0x1A]);
    assert!(t.writes.iter().all(|w| w.as_slice() != [0x1B, 0x69, 0x4B, 0x00]));
}

#[test]
fn second_job_reads_a_fresh_status() {
    let mut transport = RecordingTransport::with_status(24);
    transport.responses.push_back(status_record(12));
    let mut printer = printer(PT_1230PC, transport);
    let canvas = Canvas::new(10, 100);

    PrintJob::new(&mut printer, PrintJobOptions::new())
        .run(&canvas)
        .unwrap();
    // tape swapped for a 12mm one between jobs
    match PrintJob::new(&mut printer, PrintJobOptions::new()).run(&canvas) {
        Err(Error::CanvasTooWide {
            height: 100,
            max: 76,
            ..
        }) => {}
        other => panic!("unexpected {:?}", other),
    }

    let t = printer.transport();
    let requests = t
        .writes
        .iter()
        .filter(|w| w.as_slice() == [0x1B, 0x69, 0x53])
        .count();
    assert_eq!(requests, 2);
    assert_eq!(t.raster_lines().len(), 10);
    assert_eq!(t.finalize_bytes(), vec![0x1A]);
}

#[test]
fn preamble_order_on_magic_devices() {
    let mut printer = printer(PT_D460BT, RecordingTransport::with_status(12));
    let canvas = Canvas::new(300, 70);
    let options = PrintJobOptions::new().copies(2).chain(true);

    PrintJob::new(&mut printer, options).run(&canvas).unwrap();

    let info = vec![0x1B, 0x69, 0x7A, 0, 0, 12, 0, 0x2C, 0x01, 0, 0, 0x02, 0];
    let chain = vec![0x1B, 0x69, 0x4B, 0x00];
    let magic = vec![0x1B, 0x69, 0x64, 0x0E, 0x00, 0x4D, 0x00];
    let precut = vec![0x1B, 0x69, 0x4D, 0x40];
    let raster_mode = vec![0x1B, 0x69, 0x61, 0x01];

    let commands: Vec<Vec<u8>> = printer
        .transport()
        .after_status()
        .iter()
        .filter(|w| w[0] == 0x1B)
        .cloned()
        .collect();
    assert_eq!(
        commands,
        vec![
            raster_mode.clone(),
            info.clone(),
            chain,
            magic.clone(),
            precut.clone(),
            raster_mode,
            info,
            magic,
            precut,
        ]
    );
}

#[test]
fn lite_devices_need_no_raster_command() {
    let mut printer = printer(PT_1230PC_LITE, RecordingTransport::with_status(12));
    PrintJob::new(&mut printer, PrintJobOptions::new())
        .run(&Canvas::new(5, 76))
        .unwrap();

    let after = printer.transport().after_status();
    assert_eq!(after[0][0], b'G');
    assert_eq!(after[0].len(), 3 + 16);
}

#[test]
fn unsupported_device_fails_fast() {
    let mut printer = printer(PT_E550W, RecordingTransport::with_status(12));
    let result = PrintJob::new(&mut printer, PrintJobOptions::new()).run(&Canvas::new(5, 20));

    assert!(matches!(result, Err(Error::RasterModeUnsupported("PT-E550W"))));
    assert!(printer.transport().writes.is_empty());
}

#[test]
fn transmit_error_abandons_the_job() {
    let mut transport = RecordingTransport::with_status(12);
    // initialize, status request, raster start, then the fifth raster line
    transport.short_write_at = Some(3 + 4);
    let mut printer = printer(PT_1230PC, transport);

    let result = PrintJob::new(&mut printer, PrintJobOptions::new()).run(&Canvas::new(20, 76));

    assert!(matches!(result, Err(Error::TransmitError { .. })));
    assert_eq!(printer.state(), State::Aborted);
    let t = printer.transport();
    assert_eq!(t.raster_lines().len(), 5);
    assert!(t.finalize_bytes().is_empty());
}

#[test]
fn failed_write_is_a_transmit_error() {
    let mut transport = RecordingTransport::with_status(12);
    transport.fail_write_at = Some(3);
    let mut printer = printer(PT_1230PC, transport);

    let result = PrintJob::new(&mut printer, PrintJobOptions::new()).run(&Canvas::new(20, 76));

    assert!(matches!(
        result,
        Err(Error::TransmitError { written: 0, .. })
    ));
    assert!(printer.transport().raster_lines().is_empty());
}

#[test]
fn forced_tape_width_skips_the_status_query() {
    let mut printer = printer(PT_1230PC, RecordingTransport::default());
    let options = PrintJobOptions::new().force_tape_width(76);

    PrintJob::new(&mut printer, options)
        .run(&Canvas::new(3, 76))
        .unwrap();

    let t = printer.transport();
    assert!(t.writes.iter().all(|w| w.as_slice() != [0x1B, 0x69, 0x53]));
    assert_eq!(t.raster_lines().len(), 3);
}

#[test]
fn empty_canvas_is_not_printed() {
    let mut printer = printer(PT_1230PC, RecordingTransport::with_status(12));
    let result = PrintJob::new(&mut printer, PrintJobOptions::new()).run(&Canvas::new(0, 76));
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
    assert!(printer.transport().writes.is_empty());
}
