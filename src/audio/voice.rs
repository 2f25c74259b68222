use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;

#[derive(Clone, Debug)]
pub struct Voice {
    pub pos: f64, // f32 stops advancing past 2^24 frames
    pub speed: f32,
    pub gain_left: f32,
    pub gain_right: f32,
    pub playing: bool,
    pub looping: bool,
}

impl Default for Voice {
    fn default() -> Self {
        Self {
            pos: 0.0,
            speed: 1.0,
            gain_left: 1.0,
            gain_right: 1.0,
            playing: false,
            looping: false,
        }
    }
}

impl Voice {
    pub fn one_shot(gain: f32) -> Self {
        Self {
            gain_left: gain,
            gain_right: gain,
            playing: true,
            ..Self::default()
        }
    }

    // mixes into `out`, never overwrites it
    pub fn render_into(&mut self, buffer: &SampleBuffer, out: &mut [StereoFrame]) {
        if !self.playing {
            return;
        }
        let len = buffer.data.len();
        if len == 0 {
            self.playing = false;
            return;
        }
        let end = len as f64;
        let data = &buffer.data;

        for frame in out.iter_mut() {
            if self.pos >= end {
                if self.looping {
                    self.pos %= end;
                } else {
                    // a finished player sits at the start, ready to play again
                    self.pos = 0.0;
                    self.playing = false;
                    break;
                }
            }

            let i = self.pos as usize;
            let frac = (self.pos - i as f64) as f32;
            let s0 = data[i];
            let s1 = match data.get(i + 1) {
                Some(s) => *s,
                None if self.looping => data[0],
                None => s0,
            };
            let sample = s0.lerp(s1, frac);

            frame.left += sample.left * self.gain_left;
            frame.right += sample.right * self.gain_right;

            self.pos += self.speed as f64;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> SampleBuffer {
        SampleBuffer {
            data: (0..n).map(|i| StereoFrame::mono(i as f32)).collect(),
        }
    }

    #[test]
    fn paused_voice_renders_nothing() {
        let buf = ramp(8);
        let mut v = Voice::default();
        let mut out = vec![StereoFrame::zero(); 4];
        v.render_into(&buf, &mut out);
        assert!(out.iter().all(|f| *f == StereoFrame::zero()));
        assert_eq!(v.pos, 0.0);
    }

    #[test]
    fn looping_voice_wraps_to_start() {
        let buf = ramp(4);
        let mut v = Voice { playing: true, looping: true, ..Voice::default() };
        let mut out = vec![StereoFrame::zero(); 6];
        v.render_into(&buf, &mut out);
        let lefts: Vec<f32> = out.iter().map(|f| f.left).collect();
        assert_eq!(lefts, vec![0.0, 1.0, 2.0, 3.0, 0.0, 1.0]);
        assert!(v.playing);
    }

    #[test]
    fn non_looping_voice_stops_and_rewinds() {
        let buf = ramp(3);
        let mut v = Voice::one_shot(1.0);
        let mut out = vec![StereoFrame::zero(); 5];
        v.render_into(&buf, &mut out);
        assert!(!v.playing);
        assert_eq!(v.pos, 0.0);
        assert_eq!(out[3], StereoFrame::zero());
    }

    #[test]
    fn speed_and_channel_gain_apply() {
        let buf = ramp(8);
        let mut v = Voice {
            playing: true,
            speed: 2.0,
            gain_left: 1.0,
            gain_right: 0.5,
            ..Voice::default()
        };
        let mut out = vec![StereoFrame::zero(); 3];
        v.render_into(&buf, &mut out);
        assert_eq!(out[2].left, 4.0);
        assert_eq!(out[2].right, 2.0);
    }

    #[test]
    fn fractional_speed_interpolates() {
        let buf = ramp(4);
        let mut v = Voice { playing: true, speed: 0.5, ..Voice::default() };
        let mut out = vec![StereoFrame::zero(); 2];
        v.render_into(&buf, &mut out);
        assert_eq!(out[1].left, 0.5);
    }

    #[test]
    fn long_buffer_still_reaches_the_end_and_wraps() {
        let len = (1 << 24) + 1000;
        let mut data = vec![StereoFrame::zero(); len];
        data[0] = StereoFrame::mono(1.0);
        let buf = SampleBuffer { data };
        let mut v = Voice {
            pos: 16_777_200.0,
            playing: true,
            looping: true,
            ..Voice::default()
        };
        let mut out = vec![StereoFrame::zero(); 4096];
        v.render_into(&buf, &mut out);

        // 1016 frames to the end, then the start of the buffer again
        assert_eq!(out[1016].left, 1.0);
        assert_eq!(v.pos, 3080.0);
    }

    #[test]
    fn slow_speed_advances_past_two_to_the_23() {
        let buf = SampleBuffer { data: vec![StereoFrame::zero(); (1 << 23) + 16] };
        let start = (1u64 << 23) as f64;
        let mut v = Voice { pos: start, speed: 0.5, playing: true, ..Voice::default() };
        let mut out = vec![StereoFrame::zero(); 8];
        v.render_into(&buf, &mut out);
        assert_eq!(v.pos, start + 4.0);
    }
}
