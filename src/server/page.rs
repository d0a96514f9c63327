/// 引用页面
///
/// 引用由 `/quote` 选取；背景爱心按批回放 `/hearts` 的帧，
/// 每批都从上一批的末状态续播。
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="ru">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Случайная цитата</title>
    <meta name="description" content="Генератор случайных цитат на разных языках: мудрые мысли, афоризмы и высказывания известных личностей со всего мира.">
    <style>
        html, body { margin: 0; height: 100%; }
        body {
            font-family: Georgia, serif;
            background: linear-gradient(135deg, #ffdde1, #ee9ca7);
            display: flex;
            align-items: center;
            justify-content: center;
        }
        #bgCanvas { position: fixed; inset: 0; z-index: 0; }
        .quote-container {
            position: relative;
            z-index: 1;
            max-width: 40rem;
            padding: 2rem;
            border-radius: 1rem;
            background: rgba(255, 255, 255, 0.85);
            text-align: center;
        }
        #quote-text { font-size: 1.4rem; min-height: 4rem; }
        .btn-newQuote, .select-language { font-size: 1rem; padding: 0.4rem 1rem; }
    </style>
</head>
<body>
    <canvas id="bgCanvas"></canvas>
    <div class="quote-container">
        <h1>Случайная цитата</h1>
        <select id="language-select" class="select-language">
            <option value="any">Все языки</option>
            <option value="ru">Русский</option>
            <option value="en">Английский</option>
            <option value="es">Испанский</option>
            <option value="fr">Французский</option>
            <option value="de">Немецкий</option>
        </select>
        <p id="quote-text">Загрузка...</p>
        <button id="new-quote-button" class="btn-newQuote">Новая цитата</button>
    </div>

    <script>
        const quoteText = document.getElementById('quote-text');
        const languageSelect = document.getElementById('language-select');

        async function updateQuote() {
            const lang = languageSelect.value;
            try {
                const response = await fetch('/quote?lang=' + encodeURIComponent(lang));
                quoteText.textContent = await response.text();
            } catch (e) {
                quoteText.textContent = 'Ошибка: ' + e;
            }
        }

        document.getElementById('new-quote-button').addEventListener('click', updateQuote);
        languageSelect.addEventListener('change', updateQuote);
        updateQuote();

        const canvas = document.getElementById('bgCanvas');
        const ctx = canvas.getContext('2d');
        const cameraZ = 30, cameraY = 3, fov = 75 * Math.PI / 180;
        const batchSize = 600;
        let frames = [], frameIndex = 0, loading = false;
        let state = null;

        function resize() {
            canvas.width = window.innerWidth;
            canvas.height = window.innerHeight;
        }

        function currentAspect() {
            return window.innerWidth / window.innerHeight;
        }

        // 第一批从服务端随机初始化，之后每批都从上一批的末状态继续
        async function loadFrames() {
            if (loading) return;
            loading = true;
            try {
                let response;
                if (state === null) {
                    response = await fetch('/hearts?aspect=' + currentAspect() + '&ticks=' + batchSize);
                } else {
                    response = await fetch('/hearts', {
                        method: 'POST',
                        headers: { 'Content-Type': 'application/json' },
                        body: JSON.stringify({
                            bounds: state.bounds,
                            hearts: state.hearts,
                            aspect: currentAspect(),
                            start: state.tick,
                            ticks: batchSize,
                        }),
                    });
                }
                const body = await response.json();
                frames = frames.slice(frameIndex).concat(body.frames);
                frameIndex = 0;
                state = {
                    bounds: body.bounds,
                    hearts: body.hearts,
                    tick: body.frames.length > 0 ? body.frames[body.frames.length - 1].tick : 0,
                };
            } finally {
                loading = false;
            }
        }

        function drawHeart(x, y, size, rx, ry) {
            ctx.save();
            ctx.translate(x, y);
            ctx.scale(Math.cos(ry), Math.cos(rx));
            ctx.beginPath();
            ctx.moveTo(0, size * 0.3);
            ctx.bezierCurveTo(0, 0, -size * 0.5, 0, -size * 0.5, size * 0.3);
            ctx.bezierCurveTo(-size * 0.5, size * 0.6, 0, size * 0.8, 0, size);
            ctx.bezierCurveTo(0, size * 0.8, size * 0.5, size * 0.6, size * 0.5, size * 0.3);
            ctx.bezierCurveTo(size * 0.5, 0, 0, 0, 0, size * 0.3);
            ctx.fillStyle = '#ff0000';
            ctx.fill();
            ctx.restore();
        }

        function animate() {
            requestAnimationFrame(animate);
            ctx.clearRect(0, 0, canvas.width, canvas.height);
            if (frames.length === 0) return;

            const focal = canvas.height / 2 / Math.tan(fov / 2);
            for (const heart of frames[frameIndex].hearts) {
                const depth = cameraZ - heart.z;
                const sx = canvas.width / 2 + heart.x * focal / depth;
                const sy = canvas.height / 2 - (heart.y - cameraY) * focal / depth;
                drawHeart(sx, sy, 4 * focal / depth, heart.rx, heart.ry);
            }

            if (frameIndex < frames.length - 1) {
                frameIndex += 1;
            }
            if (frames.length - frameIndex < batchSize / 2) {
                loadFrames().catch(() => {});
            }
        }

        // 视口变化只影响下一批的边界，不重置爱心
        window.addEventListener('resize', resize);
        resize();
        loadFrames().catch(() => {}).then(animate);
    </script>
</body>
</html>
"##;
